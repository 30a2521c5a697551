//! Request-spacing rate limiter
//!
//! Converts a per-minute request budget into a minimum interval between the
//! starts of consecutive requests.

use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use super::clock::SharedClock;

/// Rate limiter enforcing `60 / max_requests_per_minute` seconds between requests
pub struct RateLimiter {
    min_interval: Duration,
    last_start: Mutex<Option<Duration>>,
    clock: SharedClock,
}

impl RateLimiter {
    /// Create a limiter from a per-minute request budget
    ///
    /// # Arguments
    /// * `max_requests_per_minute` - Maximum requests allowed per minute (must be > 0)
    /// * `clock` - Time source used for spacing and waits
    pub fn per_minute(max_requests_per_minute: u32, clock: SharedClock) -> Result<Self, RateLimitError> {
        if max_requests_per_minute == 0 {
            return Err(RateLimitError::InvalidBudget(max_requests_per_minute));
        }
        let min_interval = Duration::from_secs(60) / max_requests_per_minute;
        Ok(Self::with_interval(min_interval, clock))
    }

    /// Create a limiter with an explicit minimum interval
    pub fn with_interval(min_interval: Duration, clock: SharedClock) -> Self {
        Self {
            min_interval,
            last_start: Mutex::new(None),
            clock,
        }
    }

    /// Minimum spacing between request starts
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next request may start, then mark it as started.
    ///
    /// The lock is held across the wait so concurrent callers are serialized.
    /// Returns the delay that was applied.
    pub async fn acquire(&self) -> Duration {
        let mut last_start = self.last_start.lock().await;

        let wait = match *last_start {
            Some(previous) => {
                let elapsed = self.clock.now().saturating_sub(previous);
                self.min_interval.saturating_sub(elapsed)
            }
            None => Duration::ZERO,
        };

        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "Rate limiter delaying request");
            self.clock.sleep(wait).await;
        }

        *last_start = Some(self.clock.now());
        wait
    }
}

/// Rate limiter errors
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Budget cannot produce a finite interval
    #[error("invalid rate budget: {0} requests per minute")]
    InvalidBudget(u32),
}
