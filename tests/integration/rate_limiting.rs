//! Request spacing under a per-minute budget

use crate::support::{self, status, success, ScriptedTransport};
use coinglass_ingest::downloader::clock::{Clock, ManualClock, SharedClock};
use coinglass_ingest::downloader::RateLimiter;
use coinglass_ingest::fetcher::RequestDescriptor;
use proptest::prelude::*;
use serde_json::json;
use std::time::Duration;

fn descriptor() -> RequestDescriptor {
    RequestDescriptor::new("/futures/supported-coins")
}

#[tokio::test]
async fn test_consecutive_requests_are_spaced() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![success(json!([])), success(json!([])), success(json!([]))],
    );
    let client = support::client(transport.clone(), clock.clone(), 30);

    for _ in 0..3 {
        client.fetch(&descriptor()).await.unwrap();
    }

    let starts: Vec<Duration> = transport.calls().iter().map(|c| c.at).collect();
    assert_eq!(
        starts,
        vec![
            Duration::ZERO,
            Duration::from_secs(2),
            Duration::from_secs(4)
        ]
    );
}

#[tokio::test]
async fn test_retries_count_against_budget() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![status(500, "oops"), success(json!([]))],
    );
    // 3s spacing with a 2s backoff: the limiter tops up the difference
    let client = support::client(transport.clone(), clock.clone(), 20);

    client.fetch(&descriptor()).await.unwrap();

    let starts: Vec<Duration> = transport.calls().iter().map(|c| c.at).collect();
    assert_eq!(starts, vec![Duration::ZERO, Duration::from_secs(3)]);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(2), Duration::from_secs(1)]
    );
}

#[tokio::test]
async fn test_elapsed_work_reduces_wait() {
    let clock = ManualClock::shared();
    let shared: SharedClock = clock.clone();
    let limiter = RateLimiter::per_minute(30, shared).unwrap();

    limiter.acquire().await;
    clock.advance(Duration::from_millis(1_250));
    assert_eq!(limiter.acquire().await, Duration::from_millis(750));
    assert_eq!(clock.now(), Duration::from_secs(2));
}

proptest! {
    #[test]
    fn prop_gaps_never_below_budget_interval(budget in 1u32..=120, requests in 2usize..8) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let clock = ManualClock::shared();
            let shared: SharedClock = clock.clone();
            let limiter = RateLimiter::per_minute(budget, shared).unwrap();
            let interval = Duration::from_secs(60) / budget;

            let mut starts = Vec::new();
            for _ in 0..requests {
                limiter.acquire().await;
                starts.push(clock.now());
            }

            for pair in starts.windows(2) {
                prop_assert!(pair[1] - pair[0] >= interval);
            }
            Ok(())
        })?;
    }
}
