//! Text-generation provider seam and the Hugging Face inference implementation.

use async_trait::async_trait;
use http::StatusCode;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub do_sample: bool,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 100,
            temperature: 0.7,
            do_sample: true,
            top_p: 0.9,
            repetition_penalty: 1.1,
        }
    }
}

/// JSON body posted to the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub inputs: String,
    pub parameters: GenerationParameters,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { inputs: prompt.into(), parameters: GenerationParameters::default() }
    }
}

/// Result of one provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    /// First `generated_text` of the response array; empty when the field was missing.
    Success(String),
    /// HTTP 429, with the provider's `Retry-After` when it sent one.
    RateLimited { retry_after: Option<Duration> },
    /// HTTP 503 carrying `estimated_time`: the model is still loading.
    Loading { estimated: Duration },
    /// Any other non-success status.
    HttpError { status: u16, message: String },
    Timeout,
    /// 2xx with a body that is not a non-empty array of generations.
    Malformed(String),
    /// No response (connection refused, DNS, TLS, ...).
    Transport(String),
}

/// One attempt against a text-generation backend.
///
/// Implementations report every outcome in the return value; retry policy
/// belongs to [`CaptionService`](crate::CaptionService).
#[async_trait]
pub trait CaptionProvider: Send + Sync + std::fmt::Debug {
    async fn generate(&self, request: &GenerationRequest) -> ProviderOutcome;
}

#[derive(Debug, Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    estimated_time: Option<f64>,
}

/// Hugging Face inference API client (`POST <api_url>`, bearer auth).
#[derive(Debug, Clone)]
pub struct HuggingFaceProvider {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HuggingFaceProvider {
    /// Build a provider whose HTTP client aborts calls after `timeout`.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_url: api_url.into(), api_key: api_key.into() })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl CaptionProvider for HuggingFaceProvider {
    async fn generate(&self, request: &GenerationRequest) -> ProviderOutcome {
        tracing::trace!(target: "moodchick::provider", url = %self.api_url, "posting generation request");

        let response = match self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_failure(e),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return ProviderOutcome::RateLimited { retry_after };
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return transport_failure(e),
        };

        if !status.is_success() {
            return classify_error(status, &body);
        }

        match serde_json::from_slice::<Vec<Generation>>(&body) {
            Ok(generations) => match generations.into_iter().next() {
                Some(first) => ProviderOutcome::Success(first.generated_text.unwrap_or_default()),
                None => ProviderOutcome::Malformed("empty response array".into()),
            },
            Err(e) => ProviderOutcome::Malformed(e.to_string()),
        }
    }
}

fn transport_failure(e: reqwest::Error) -> ProviderOutcome {
    if e.is_timeout() {
        ProviderOutcome::Timeout
    } else {
        ProviderOutcome::Transport(e.to_string())
    }
}

fn classify_error(status: StatusCode, body: &[u8]) -> ProviderOutcome {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

    if status == StatusCode::SERVICE_UNAVAILABLE {
        if let Some(estimated) =
            parsed.estimated_time.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        {
            return ProviderOutcome::Loading { estimated };
        }
    }

    let message = match parsed.error {
        Some(serde_json::Value::String(message)) => message,
        Some(other) => other.to_string(),
        None => status.canonical_reason().unwrap_or("unknown error").to_owned(),
    };
    ProviderOutcome::HttpError { status: status.as_u16(), message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn provider(server: &Server) -> HuggingFaceProvider {
        HuggingFaceProvider::new(format!("{}/models/test", server.url()), "hf_test", Duration::from_secs(5))
            .expect("client")
    }

    #[test]
    fn request_serializes_fixed_parameters() {
        let body = serde_json::to_value(GenerationRequest::new("prompt")).unwrap();
        assert_eq!(body["inputs"], "prompt");
        assert_eq!(body["parameters"]["max_new_tokens"], 100);
        assert_eq!(body["parameters"]["do_sample"], true);
        let close = |v: &serde_json::Value, x: f64| (v.as_f64().unwrap() - x).abs() < 1e-6;
        assert!(close(&body["parameters"]["temperature"], 0.7));
        assert!(close(&body["parameters"]["top_p"], 0.9));
        assert!(close(&body["parameters"]["repetition_penalty"], 1.1));
    }

    #[tokio::test]
    async fn success_returns_first_generated_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test")
            .match_header("authorization", "Bearer hf_test")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({ "inputs": "be happy" })))
            .with_status(200)
            .with_body(r#"[{"generated_text":"first"},{"generated_text":"second"}]"#)
            .create_async()
            .await;

        let outcome = provider(&server).generate(&GenerationRequest::new("be happy")).await;

        assert_eq!(outcome, ProviderOutcome::Success("first".into()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_generated_text_is_empty_success() {
        let mut server = Server::new_async().await;
        server.mock("POST", "/models/test").with_status(200).with_body("[{}]").create_async().await;

        let outcome = provider(&server).generate(&GenerationRequest::new("x")).await;
        assert_eq!(outcome, ProviderOutcome::Success(String::new()));
    }

    #[tokio::test]
    async fn empty_or_non_array_body_is_malformed() {
        let mut server = Server::new_async().await;
        server.mock("POST", "/models/test").with_status(200).with_body("[]").create_async().await;
        let outcome = provider(&server).generate(&GenerationRequest::new("x")).await;
        assert!(matches!(outcome, ProviderOutcome::Malformed(_)), "{outcome:?}");

        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/test")
            .with_status(200)
            .with_body(r#"{"generated_text":"not an array"}"#)
            .create_async()
            .await;
        let outcome = provider(&server).generate(&GenerationRequest::new("x")).await;
        assert!(matches!(outcome, ProviderOutcome::Malformed(_)), "{outcome:?}");
    }

    #[tokio::test]
    async fn rate_limited_reads_retry_after() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/test")
            .with_status(429)
            .with_header("retry-after", "7")
            .create_async()
            .await;

        let outcome = provider(&server).generate(&GenerationRequest::new("x")).await;
        assert_eq!(outcome, ProviderOutcome::RateLimited { retry_after: Some(Duration::from_secs(7)) });
    }

    #[tokio::test]
    async fn rate_limited_without_header() {
        let mut server = Server::new_async().await;
        server.mock("POST", "/models/test").with_status(429).create_async().await;

        let outcome = provider(&server).generate(&GenerationRequest::new("x")).await;
        assert_eq!(outcome, ProviderOutcome::RateLimited { retry_after: None });
    }

    #[tokio::test]
    async fn loading_model_reports_estimated_time() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/test")
            .with_status(503)
            .with_body(r#"{"error":"Model google/flan-t5-small is currently loading","estimated_time":20.5}"#)
            .create_async()
            .await;

        let outcome = provider(&server).generate(&GenerationRequest::new("x")).await;
        assert_eq!(outcome, ProviderOutcome::Loading { estimated: Duration::from_millis(20_500) });
    }

    #[tokio::test]
    async fn unavailable_without_estimate_is_http_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/test")
            .with_status(503)
            .with_body(r#"{"error":"overloaded"}"#)
            .create_async()
            .await;

        let outcome = provider(&server).generate(&GenerationRequest::new("x")).await;
        assert_eq!(outcome, ProviderOutcome::HttpError { status: 503, message: "overloaded".into() });
    }

    #[tokio::test]
    async fn other_statuses_carry_provider_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/models/test")
            .with_status(401)
            .with_body(r#"{"error":"Invalid credentials in Authorization header"}"#)
            .create_async()
            .await;
        let outcome = provider(&server).generate(&GenerationRequest::new("x")).await;
        assert_eq!(
            outcome,
            ProviderOutcome::HttpError {
                status: 401,
                message: "Invalid credentials in Authorization header".into()
            }
        );

        let mut server = Server::new_async().await;
        server.mock("POST", "/models/test").with_status(500).with_body("oops").create_async().await;
        let outcome = provider(&server).generate(&GenerationRequest::new("x")).await;
        assert_eq!(
            outcome,
            ProviderOutcome::HttpError { status: 500, message: "Internal Server Error".into() }
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let provider =
            HuggingFaceProvider::new("http://127.0.0.1:9/models/test", "k", Duration::from_secs(2))
                .unwrap();
        let outcome = provider.generate(&GenerationRequest::new("x")).await;
        assert!(
            matches!(outcome, ProviderOutcome::Transport(_) | ProviderOutcome::Timeout),
            "{outcome:?}"
        );
    }
}
