//! Request execution constants and backoff policy

use std::time::Duration;

/// Default request budget, matching the Hobbyist plan allowance.
pub const DEFAULT_MAX_REQUESTS_PER_MINUTE: u32 = 30;

/// Total attempts per logical request (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between a retryable failure and the next attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay applied between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Same delay after every failure
    Fixed(Duration),
    /// `initial * 2^retry`, capped at `max`
    Exponential {
        /// Delay after the first failure
        initial: Duration,
        /// Upper bound
        max: Duration,
    },
}

impl BackoffPolicy {
    /// Delay before retry number `retry` (0-based: 0 is the pause after the first failure)
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            BackoffPolicy::Fixed(delay) => delay,
            BackoffPolicy::Exponential { initial, max } => {
                let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
                initial.checked_mul(factor).unwrap_or(max).min(max)
            }
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy::Fixed(DEFAULT_RETRY_BACKOFF)
    }
}
