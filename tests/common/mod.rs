#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use http::{Request, Response};
use http_body_util::BodyExt;
use moodchick::caption::GenerationRequest;
use moodchick::{CaptionConfig, CaptionProvider, ProviderOutcome};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub const START: u64 = 1_700_000_000_000;

/// Provider that plays back queued outcomes, then repeats `then` forever.
#[derive(Debug)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<ProviderOutcome>>,
    then: ProviderOutcome,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(script: impl IntoIterator<Item = ProviderOutcome>, then: ProviderOutcome) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            then,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(outcome: ProviderOutcome) -> Self {
        Self::new([], outcome)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CaptionProvider for ScriptedProvider {
    async fn generate(&self, request: &GenerationRequest) -> ProviderOutcome {
        self.prompts.lock().unwrap().push(request.inputs.clone());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.then.clone())
    }
}

/// Configured settings pointing at nothing; pair with a scripted provider.
pub fn configured() -> CaptionConfig {
    CaptionConfig {
        api_key: "hf_test".into(),
        api_url: "http://127.0.0.1:9/unused".into(),
        timeout: Duration::from_secs(5),
        max_retries: 3,
        retry_delay: Duration::from_millis(10),
        ..CaptionConfig::default()
    }
}

pub fn post_caption(body: &str, ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/generate-caption")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_owned()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn header<B>(response: &Response<B>, name: &str) -> String {
    response.headers().get(name).unwrap().to_str().unwrap().to_owned()
}
