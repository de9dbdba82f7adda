use crate::clock::{Clock, SystemClock};
use crate::rate_limit::{ClientId, Decision, RateLimiter};
use dashmap::DashMap;
use std::time::Duration;

/// Window length used by the caption endpoint.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Per-client counter for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests admitted in the current window.
    pub count: u32,
    /// End of the window, milliseconds since the Unix epoch.
    pub reset_at: u64,
}

/// Fixed-window counter rate limiter.
///
/// A client's first request opens a window of `window` length; up to `limit`
/// requests are admitted inside it and the rest are rejected without touching
/// the counter. The first request at or after the window end opens a new one.
///
/// Known limitation: windows are fixed, not sliding, so a client can land up to
/// `2 × limit` requests around a window boundary (the tail of one window and the
/// head of the next).
///
/// `check` runs under the map's per-key entry lock, so concurrent requests from
/// the same client never lose increments.
#[derive(Debug)]
pub struct FixedWindowLimiter<C = SystemClock> {
    limit: u32,
    window: Duration,
    entries: DashMap<String, RateLimitEntry>,
    clock: C,
}

impl FixedWindowLimiter<SystemClock> {
    /// Create a limiter on the wall clock. Panics if `limit` is zero or `window` is zero.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_clock(limit, window, SystemClock)
    }

    /// `limit` requests per minute.
    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, DEFAULT_WINDOW)
    }
}

impl<C: Clock> FixedWindowLimiter<C> {
    /// Create a limiter reading time from `clock`. Panics if `limit` is zero or `window` is zero.
    pub fn with_clock(limit: u32, window: Duration, clock: C) -> Self {
        assert!(limit > 0, "rate limit must allow at least one request per window");
        assert!(!window.is_zero(), "rate limit window must be non-zero");
        Self { limit, window, entries: DashMap::new(), clock }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Snapshot of a client's live state, if any.
    pub fn entry(&self, client: &ClientId) -> Option<RateLimitEntry> {
        self.entries.get(client.as_str()).map(|e| *e.value())
    }

    /// Number of tracked clients, including expired ones not yet cleaned up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn window_millis(&self) -> u64 {
        u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX)
    }
}

impl<C: Clock> RateLimiter for FixedWindowLimiter<C> {
    fn check(&self, client: &ClientId) -> Decision {
        let now = self.clock.now_millis();
        // A fresh entry starts already expired and is reset below.
        let mut slot = self
            .entries
            .entry(client.as_str().to_owned())
            .or_insert(RateLimitEntry { count: 0, reset_at: 0 });
        let entry = slot.value_mut();

        if now >= entry.reset_at {
            *entry = RateLimitEntry { count: 1, reset_at: now.saturating_add(self.window_millis()) };
            return Decision::Allowed { remaining: self.limit - 1, reset_at: entry.reset_at };
        }

        if entry.count >= self.limit {
            return Decision::Denied {
                reset_at: entry.reset_at,
                wait: Duration::from_millis(entry.reset_at - now),
            };
        }

        entry.count += 1;
        Decision::Allowed { remaining: self.limit - entry.count, reset_at: entry.reset_at }
    }

    fn cleanup(&self) -> usize {
        let now = self.clock.now_millis();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = entry.reset_at > now;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    fn limit(&self) -> u32 {
        self.limit
    }
}
