use crate::rate_limit::{identify, Decision, RateLimiter};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// A layer that enforces rate limits using a [`RateLimiter`].
#[derive(Debug)]
pub struct RateLimitLayer<L> {
    limiter: Arc<L>,
}

impl<L> RateLimitLayer<L> {
    /// Create a new rate limit layer sharing `limiter` (the cleanup task holds the other handle).
    pub fn new(limiter: Arc<L>) -> Self {
        Self { limiter }
    }
}

impl<L> Clone for RateLimitLayer<L> {
    fn clone(&self) -> Self {
        Self { limiter: self.limiter.clone() }
    }
}

impl<S, L> Layer<S> for RateLimitLayer<L>
where
    L: RateLimiter + 'static,
{
    type Service = RateLimitService<S, L>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService { inner: service, limiter: self.limiter.clone() }
    }
}

/// Middleware service that admits or rejects each HTTP request.
///
/// Admitted responses carry `X-RateLimit-*` headers; rejected requests never
/// reach the inner service and get a 429 with `Retry-After`.
#[derive(Debug)]
pub struct RateLimitService<S, L> {
    inner: S,
    limiter: Arc<L>,
}

impl<S: Clone, L> Clone for RateLimitService<S, L> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), limiter: self.limiter.clone() }
    }
}

impl<S, L, B> Service<Request<B>> for RateLimitService<S, L>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    L: RateLimiter + 'static,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let client = identify(req.headers());
        let decision = self.limiter.check(&client);
        let limit = self.limiter.limit();

        if let Decision::Denied { wait, .. } = decision {
            tracing::warn!(
                target: "moodchick::rate_limit",
                client = %client,
                retry_after_ms = wait.as_millis() as u64,
                "rate limit exceeded"
            );
            return Box::pin(futures::future::ready(Ok(too_many_requests(limit, &decision))));
        }

        // The clone is not necessarily ready; keep the one `poll_ready` was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move {
            let mut response = inner.call(req).await?;
            apply_headers(response.headers_mut(), limit, &decision);
            Ok(response)
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitedBody {
    error: &'static str,
    retry_after: u64,
}

fn too_many_requests(limit: u32, decision: &Decision) -> Response {
    let retry_after = retry_after_secs(decision);
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(RateLimitedBody { error: "Too many requests", retry_after }),
    )
        .into_response();
    let headers = response.headers_mut();
    headers.insert(http::header::RETRY_AFTER, HeaderValue::from(retry_after));
    apply_headers(headers, limit, decision);
    response
}

fn apply_headers(headers: &mut HeaderMap, limit: u32, decision: &Decision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining()));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_at().div_ceil(1000)));
}

/// Whole seconds until the window resets, rounded up and never below one.
fn retry_after_secs(decision: &Decision) -> u64 {
    match decision {
        Decision::Denied { wait, .. } => {
            let millis = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
            millis.div_ceil(1000).max(1)
        }
        Decision::Allowed { .. } => 0,
    }
}
