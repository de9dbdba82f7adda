use crate::rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Interval used by the server bootstrap.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Spawn a task that evicts expired client state every `every`.
///
/// The first sweep happens one full interval after spawning. Abort the
/// returned handle to stop it.
pub fn spawn_cleanup<L>(limiter: Arc<L>, every: Duration) -> JoinHandle<()>
where
    L: RateLimiter + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = limiter.cleanup();
            tracing::debug!(target: "moodchick::rate_limit", removed, "rate limit cleanup sweep");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::rate_limit::{ClientId, FixedWindowLimiter, DEFAULT_WINDOW};

    #[tokio::test(start_paused = true)]
    async fn sweeps_expired_entries_on_schedule() {
        let clock = ManualClock::new(0);
        let limiter = Arc::new(FixedWindowLimiter::with_clock(10, DEFAULT_WINDOW, clock.clone()));
        limiter.check(&ClientId::new("a"));
        limiter.check(&ClientId::new("b"));

        let handle = spawn_cleanup(limiter.clone(), Duration::from_secs(300));
        clock.advance(61_000);

        tokio::time::sleep(Duration::from_secs(299)).await;
        tokio::task::yield_now().await;
        assert_eq!(limiter.len(), 2, "no sweep before the first interval");

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(limiter.is_empty());

        handle.abort();
    }
}
