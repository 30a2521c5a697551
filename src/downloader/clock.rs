//! Clock abstraction for rate limiting and retry backoff
//!
//! Every wait in the pipeline goes through [`Clock::sleep`], so tests can swap
//! in [`ManualClock`] and assert exact timings without real delays.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Monotonic time source with an awaitable sleep
#[async_trait]
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock backed by `tokio::time`
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Create a shared handle
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Virtual clock for deterministic tests.
///
/// Test support only; production paths use [`TokioClock`]. It is public so
/// the integration tests can drive the limiter and backoff.
///
/// `sleep` returns immediately after advancing virtual time; every requested
/// sleep is recorded in order.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Create a clock at virtual time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared handle
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Move virtual time forward without recording a sleep
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += duration;
    }

    /// Every sleep requested so far
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Sum of all recorded sleeps
    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
        self.advance(duration);
    }
}
