//! HTTP surface: the caption endpoint and a health probe.
//!
//! `POST /api/generate-caption` sits behind [`RateLimitLayer`]; the handler
//! always answers with a caption, substituting a fallback when the provider
//! fails. `GET /api/health` is not rate limited.

use crate::caption::{CaptionResult, CaptionService, CaptionSource};
use crate::config::{APP_NAME, APP_VERSION};
use crate::rate_limit::{RateLimitLayer, RateLimiter};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    pub captions: Arc<CaptionService>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateCaptionRequest {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateCaptionResponse {
    pub caption: String,
    /// Echo of the requested mood; absent when the request had none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    pub source: CaptionSource,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub provider_configured: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Build the application router. `limiter` guards the caption endpoint only.
pub fn router<L>(captions: CaptionService, limiter: Arc<L>) -> Router
where
    L: RateLimiter + 'static,
{
    let state = AppState { captions: Arc::new(captions) };

    let limited = Router::new()
        .route("/api/generate-caption", post(generate_caption))
        .layer(RateLimitLayer::new(limiter));

    Router::new().route("/api/health", get(health)).merge(limited).with_state(state)
}

async fn generate_caption(State(state): State<AppState>, body: Bytes) -> Response {
    let request: GenerateCaptionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(target: "moodchick::server", error = %e, "rejecting unparseable caption request");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { error: "Failed to generate caption" }),
            )
                .into_response();
        }
    };

    let mood = request.mood.as_deref().unwrap_or("happy");
    let result = match state.captions.generate_caption(mood, request.prompt.as_deref()).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(target: "moodchick::server", mood, error = %e, "caption generation failed, serving fallback");
            CaptionResult::fallback(mood)
        }
    };

    Json(GenerateCaptionResponse {
        caption: result.text,
        mood: request.mood,
        source: result.source,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
    .into_response()
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: APP_NAME,
        version: APP_VERSION,
        provider_configured: state.captions.is_configured(),
    })
}
