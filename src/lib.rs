#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # MoodChick
//!
//! Mood-based social-media captions behind a rate-limited HTTP endpoint.
//!
//! ## Features
//!
//! - **Fixed-window rate limiting** per client, keyed by forwarded-address headers
//! - **Retrying provider client** with provider-directed and linear backoff
//! - **Fallback captions** when the provider is unconfigured or keeps failing
//! - **Injectable time** (`Clock`, `Sleeper`) for deterministic tests
//!
//! ## Quick Start
//!
//! ```rust
//! use moodchick::{CaptionConfig, CaptionService, CaptionSource};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // No API key: the service answers from the fallback pool.
//! let service = CaptionService::new(CaptionConfig::default()).unwrap();
//! let caption = service.generate_caption("happy", None).await.unwrap();
//! assert_eq!(caption.source, CaptionSource::Fallback);
//! # });
//! ```

pub mod backoff;
pub mod caption;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod rate_limit;
pub mod server;
pub mod sleeper;

// Re-exports
pub use backoff::{Backoff, MAX_BACKOFF};
pub use caption::{
    fallback_caption, CaptionConfig, CaptionProvider, CaptionResult, CaptionService,
    CaptionSource, HuggingFaceProvider, Mood, ProviderOutcome,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::{CaptionError, ConfigError, ProviderError};
pub use rate_limit::{
    identify, spawn_cleanup, ClientId, Decision, FixedWindowLimiter, RateLimitLayer, RateLimiter,
};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
