//! Per-client rate limiting for the caption endpoint.
//!
//! This module provides the building blocks for rate limiting:
//! - [`RateLimiter`]: The core trait for admission decisions.
//! - [`FixedWindowLimiter`]: In-memory fixed-window counter keyed by client.
//! - [`identify`]: Derives a [`ClientId`] from forwarded-address headers.
//! - [`RateLimitLayer`]: Tower middleware that enforces the limit on HTTP requests.
//! - [`spawn_cleanup`]: Recurring task that evicts expired client state.
//!
//! # Architecture
//!
//! - **Middleware**: `RateLimitLayer` wraps your service. It doesn't know *how* limiting works,
//!   only that it should ask a `RateLimiter` and how to turn a [`Decision`] into headers.
//! - **Logic**: `FixedWindowLimiter` owns the client-state map and the window math.
//! - **Maintenance**: `spawn_cleanup` is started by the process bootstrap; correctness of
//!   `check` never depends on it, only memory footprint does.

use std::fmt;
use std::time::Duration;

pub mod cleanup;
pub mod fixed_window;
pub mod identify;
pub mod middleware;

pub use cleanup::spawn_cleanup;
pub use fixed_window::{FixedWindowLimiter, RateLimitEntry, DEFAULT_WINDOW};
pub use identify::identify;
pub use middleware::{RateLimitLayer, RateLimitService};

/// Stable identifier used to bucket rate-limit state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Shared bucket for loopback and unidentifiable clients.
    pub const DEVELOPMENT: &'static str = "development-client";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn development() -> Self {
        Self(Self::DEVELOPMENT.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The decision returned by a rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request is admitted.
    Allowed {
        /// Requests left in the current window after this one.
        /// Useful for `X-RateLimit-Remaining` headers.
        remaining: u32,
        /// End of the current window, milliseconds since the Unix epoch.
        reset_at: u64,
    },
    /// The request is rejected; the client's quota is unchanged.
    Denied {
        /// End of the current window, milliseconds since the Unix epoch.
        reset_at: u64,
        /// Time left until `reset_at`.
        /// Useful for `Retry-After` headers.
        wait: Duration,
    },
}

impl Decision {
    /// Helper to check if allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    /// Remaining quota; always `0` when denied.
    pub fn remaining(&self) -> u32 {
        match self {
            Decision::Allowed { remaining, .. } => *remaining,
            Decision::Denied { .. } => 0,
        }
    }

    pub fn reset_at(&self) -> u64 {
        match self {
            Decision::Allowed { reset_at, .. } | Decision::Denied { reset_at, .. } => *reset_at,
        }
    }
}

/// Core interface for admission control.
///
/// Implementations never fail: every outcome is a [`Decision`].
pub trait RateLimiter: Send + Sync {
    /// Admit or reject one request from `client`.
    fn check(&self, client: &ClientId) -> Decision;

    /// Drop state whose window has ended. Returns how many entries were removed.
    fn cleanup(&self) -> usize;

    /// Requests allowed per window, for `X-RateLimit-Limit`.
    fn limit(&self) -> u32;
}
