//! Caption service: prompt resolution, bounded retries, and fallback.
//!
//! Semantics:
//! - `max_retries` counts total attempts (initial try + retries); values below one are treated
//!   as one.
//! - An unconfigured service (empty API key) returns a fallback caption without any network
//!   call.
//! - Each attempt is bounded by `timeout`; an elapsed attempt is a retryable
//!   [`ProviderError::Timeout`].
//! - Retryable failures sleep before the next attempt: the provider's `Retry-After` for 429s,
//!   `estimated_time` for a loading model, otherwise `retry_delay × attempt`.
//! - Non-retryable failures (explicit HTTP errors, rejected credentials) return immediately.
//!
//! Invariants:
//! - Attempts never exceed `max_retries`.
//! - The sleeper is invoked at most `max_retries - 1` times per call.
//! - Failures are surfaced to the caller, never swapped for a fallback caption here.

use crate::backoff::{self, Backoff};
use crate::caption::provider::{CaptionProvider, GenerationRequest, HuggingFaceProvider, ProviderOutcome};
use crate::caption::{fallback_caption, Mood};
use crate::error::{CaptionError, ProviderError};
use crate::sleeper::{Sleeper, TokioSleeper};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "google/flan-t5-small";
pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models/google/flan-t5-small";

/// Returned when the provider answers but generates nothing.
pub const NO_CAPTION_GENERATED: &str = "No caption generated";

/// Provider settings, fixed for the service's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionConfig {
    /// Empty means "not configured".
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
    /// Total attempt budget.
    pub max_retries: usize,
    /// Base unit of the linear backoff.
    pub retry_delay: Duration,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Where a caption came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionSource {
    External,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionResult {
    pub text: String,
    /// The mood exactly as the caller supplied it.
    pub mood: String,
    pub source: CaptionSource,
}

impl CaptionResult {
    /// A caption drawn from the fallback pool for `mood`.
    pub fn fallback(mood: &str) -> Self {
        Self {
            text: fallback_caption(mood).to_owned(),
            mood: mood.to_owned(),
            source: CaptionSource::Fallback,
        }
    }
}

/// Produces captions from an external provider, with retries.
#[derive(Clone)]
pub struct CaptionService {
    config: CaptionConfig,
    provider: Arc<dyn CaptionProvider>,
    sleeper: Arc<dyn Sleeper>,
    backoff: Backoff,
}

impl std::fmt::Debug for CaptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionService")
            .field("api_url", &self.config.api_url)
            .field("configured", &self.is_configured())
            .field("max_retries", &self.config.max_retries)
            .field("backoff", &self.backoff)
            .field("provider", &self.provider)
            .field("sleeper", &"<sleeper>")
            .finish()
    }
}

impl CaptionService {
    /// Service backed by the Hugging Face inference API.
    pub fn new(config: CaptionConfig) -> Result<Self, reqwest::Error> {
        let provider =
            HuggingFaceProvider::new(config.api_url.clone(), config.api_key.clone(), config.timeout)?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Service backed by an arbitrary provider.
    pub fn with_provider(config: CaptionConfig, provider: Arc<dyn CaptionProvider>) -> Self {
        let backoff = Backoff::linear(config.retry_delay);
        Self { config, provider, sleeper: Arc::new(TokioSleeper), backoff }
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn config(&self) -> &CaptionConfig {
        &self.config
    }

    /// True iff an API key is set.
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    /// Random caption from the fixed pool; never touches the network.
    pub fn fallback_caption(&self, mood: &str) -> &'static str {
        fallback_caption(mood)
    }

    /// Generate a caption for `mood`, using `custom_prompt` instead of the mood's prompt when
    /// given.
    pub async fn generate_caption(
        &self,
        mood: &str,
        custom_prompt: Option<&str>,
    ) -> Result<CaptionResult, CaptionError> {
        if !self.is_configured() {
            tracing::info!(target: "moodchick::caption", mood, "provider API key not configured, using fallback caption");
            return Ok(CaptionResult::fallback(mood));
        }

        let prompt = match custom_prompt.filter(|p| !p.is_empty()) {
            Some(prompt) => prompt,
            None => Mood::resolve(mood).prompt(),
        };
        let request = GenerationRequest::new(prompt);
        let text = self.request_with_retry(&request).await?;

        Ok(CaptionResult { text, mood: mood.to_owned(), source: CaptionSource::External })
    }

    async fn request_with_retry(&self, request: &GenerationRequest) -> Result<String, CaptionError> {
        let max_attempts = self.config.max_retries.max(1);

        for attempt in 1..=max_attempts {
            match self.attempt(request).await {
                Ok(text) => return Ok(text),
                Err(error) if !error.is_retryable() => return Err(CaptionError::Provider(error)),
                Err(error) if attempt == max_attempts => {
                    return Err(CaptionError::RetryExhausted { attempts: attempt, last: error });
                }
                Err(error) => {
                    let delay = self.delay_after(&error, attempt);
                    tracing::warn!(
                        target: "moodchick::caption",
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "provider attempt failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }

        // The range is non-empty and its last iteration always returns.
        debug_assert!(false, "retry loop should have returned");
        unreachable!()
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let outcome = tokio::time::timeout(self.config.timeout, self.provider.generate(request))
            .await
            .unwrap_or(ProviderOutcome::Timeout);

        match outcome {
            ProviderOutcome::Success(text) if text.is_empty() => Ok(NO_CAPTION_GENERATED.to_owned()),
            ProviderOutcome::Success(text) => Ok(text),
            ProviderOutcome::RateLimited { retry_after } => {
                Err(ProviderError::RateLimited { retry_after })
            }
            ProviderOutcome::Loading { estimated } => Err(ProviderError::Loading { estimated }),
            ProviderOutcome::HttpError { status: status @ (401 | 403), message } => {
                Err(ProviderError::Unauthorized { status, message })
            }
            ProviderOutcome::HttpError { status, message } => {
                Err(ProviderError::Http { status, message })
            }
            ProviderOutcome::Timeout => Err(ProviderError::Timeout { timeout: self.config.timeout }),
            ProviderOutcome::Malformed(detail) => Err(ProviderError::Malformed(detail)),
            ProviderOutcome::Transport(detail) => Err(ProviderError::Transport(detail)),
        }
    }

    fn delay_after(&self, error: &ProviderError, attempt: usize) -> Duration {
        match error {
            ProviderError::RateLimited { retry_after: Some(after) } => backoff::clamp(*after),
            ProviderError::Loading { estimated } => backoff::clamp(*estimated),
            _ => self.backoff.delay(attempt),
        }
    }
}
