//! Error types for the caption pipeline and configuration loading.
use std::time::Duration;

use thiserror::Error;

/// Failure of a single attempt against the text-generation provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The provider throttled us (HTTP 429).
    #[error("provider rate limited the request (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },
    /// The model is still loading (HTTP 503 with `estimated_time`).
    #[error("model is loading (estimated {estimated:?})")]
    Loading { estimated: Duration },
    /// The provider rejected our credentials.
    #[error("API key rejected by provider: {status} - {message}")]
    Unauthorized { status: u16, message: String },
    /// Any other non-success status.
    #[error("provider API error: {status} - {message}")]
    Http { status: u16, message: String },
    /// The call exceeded the configured timeout.
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },
    /// The provider answered 2xx with a body we could not use.
    #[error("invalid response from provider: {0}")]
    Malformed(String),
    /// Connection-level failure before any response arrived.
    #[error("provider transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Whether another attempt may succeed. Explicit HTTP failures and
    /// credential problems are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. }
            | Self::Loading { .. }
            | Self::Timeout { .. }
            | Self::Malformed(_)
            | Self::Transport(_) => true,
            Self::Unauthorized { .. } | Self::Http { .. } => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Error surfaced by [`CaptionService::generate_caption`](crate::CaptionService::generate_caption).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptionError {
    /// A non-retryable provider failure.
    #[error(transparent)]
    Provider(ProviderError),
    /// Every attempt failed; `last` is the final attempt's error.
    #[error("caption generation failed after {attempts} attempts; last error: {last}")]
    RetryExhausted {
        attempts: usize,
        #[source]
        last: ProviderError,
    },
}

impl CaptionError {
    /// The provider error that ended the call.
    pub fn last_error(&self) -> &ProviderError {
        match self {
            Self::Provider(e) => e,
            Self::RetryExhausted { last, .. } => last,
        }
    }

    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn timeout_display_is_labeled() {
        let err = ProviderError::Timeout { timeout: Duration::from_secs(10) };
        assert!(err.to_string().contains("request timed out"));
        assert!(err.is_timeout());
        assert!(err.is_retryable());
    }

    #[test]
    fn http_and_unauthorized_are_final() {
        assert!(!ProviderError::Http { status: 500, message: "boom".into() }.is_retryable());
        assert!(!ProviderError::Unauthorized { status: 401, message: "bad key".into() }
            .is_retryable());
        assert!(ProviderError::Malformed("empty array".into()).is_retryable());
        assert!(ProviderError::Transport("refused".into()).is_retryable());
    }

    #[test]
    fn http_display_includes_status_and_message() {
        let err = ProviderError::Http { status: 400, message: "bad inputs".into() };
        assert_eq!(err.to_string(), "provider API error: 400 - bad inputs");
    }

    #[test]
    fn retry_exhausted_exposes_last_error_as_source() {
        let last = ProviderError::Loading { estimated: Duration::from_secs(20) };
        let err = CaptionError::RetryExhausted { attempts: 3, last: last.clone() };
        assert!(err.is_retry_exhausted());
        assert_eq!(err.last_error(), &last);
        assert!(err.to_string().contains("3 attempts"));
        assert_eq!(err.source().map(|s| s.to_string()), Some(last.to_string()));
    }

    #[test]
    fn provider_variant_is_transparent() {
        let inner = ProviderError::Http { status: 404, message: "no model".into() };
        let err = CaptionError::Provider(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
        assert!(!err.is_retry_exhausted());
    }
}
