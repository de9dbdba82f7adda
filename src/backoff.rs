//! Linear backoff for provider retries.
//!
//! Attempt semantics: attempt `1` is the first call. The delay slept after a
//! failed attempt `n` is `base × n`, so the default 1s base yields 1s, 2s, 3s...
//!
//! ```rust
//! use std::time::Duration;
//! use moodchick::Backoff;
//!
//! let backoff = Backoff::linear(Duration::from_millis(1000));
//! assert_eq!(backoff.delay(0), Duration::ZERO);
//! assert_eq!(backoff.delay(1), Duration::from_millis(1000));
//! assert_eq!(backoff.delay(3), Duration::from_millis(3000));
//! ```
//!
//! Overflow behavior: computations that would overflow saturate to `MAX_BACKOFF` (1 day).

use std::time::Duration;

/// Maximum delay used when calculations overflow (1 day). Provider-directed
/// delays (`Retry-After`, `estimated_time`) are clamped to it as well.
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
}

impl Backoff {
    /// Create a linear backoff strategy
    pub fn linear(base: Duration) -> Self {
        Self { base }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// Delay to sleep after failed attempt `attempt` (1-based; 0 = no delay).
    pub fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let attempt_u32 = attempt.min(u32::MAX as usize) as u32;
        self.base.checked_mul(attempt_u32).unwrap_or(MAX_BACKOFF).min(MAX_BACKOFF)
    }
}

/// Clamp a provider-supplied delay to `MAX_BACKOFF`.
pub fn clamp(delay: Duration) -> Duration {
    delay.min(MAX_BACKOFF)
}
