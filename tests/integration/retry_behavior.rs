//! Retry policy of the request executor, driven by a scripted transport

use crate::support::{self, api_failure, network_failure, status, success, ScriptedTransport};
use coinglass_ingest::downloader::clock::ManualClock;
use coinglass_ingest::downloader::config::BackoffPolicy;
use coinglass_ingest::fetcher::{FetcherError, RequestDescriptor};
use serde_json::json;
use std::time::Duration;

const BUDGET: u32 = 600;

fn descriptor() -> RequestDescriptor {
    RequestDescriptor::new("/futures/open-interest/aggregated-history")
        .param("symbol", "BTC")
        .param("interval", "4h")
}

#[tokio::test]
async fn test_two_failures_then_success() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![
            Err(network_failure("connection reset")),
            status(502, "bad gateway"),
            success(json!([{"time": 1, "open": "1"}])),
        ],
    );
    let client = support::client(transport.clone(), clock.clone(), BUDGET);

    let records = client.fetch(&descriptor()).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(transport.call_count(), 3);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(2), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn test_persistent_failure_exhausts_attempts() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![
            status(500, "oops"),
            status(500, "oops"),
            status(500, "oops"),
            success(json!([])),
        ],
    );
    let client = support::client(transport.clone(), clock.clone(), BUDGET);

    match client.fetch(&descriptor()).await {
        Err(FetcherError::RetryExhausted { attempts, last }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, FetcherError::HttpStatusError { status: 500, .. }));
        }
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
    assert_eq!(transport.call_count(), 3);
    // No pause after the final attempt
    assert_eq!(clock.sleeps().len(), 2);
}

#[tokio::test]
async fn test_api_error_is_not_retried() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![api_failure("1", "bad params"), success(json!([]))],
    );
    let client = support::client(transport.clone(), clock.clone(), BUDGET);

    match client.fetch(&descriptor()).await {
        Err(FetcherError::ApiError { code, message }) => {
            assert_eq!(code, "1");
            assert_eq!(message, "bad params");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
    assert_eq!(transport.call_count(), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_not_retried() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![status(200, "not json at all"), success(json!([]))],
    );
    let client = support::client(transport.clone(), clock.clone(), BUDGET);

    assert!(matches!(
        client.fetch(&descriptor()).await,
        Err(FetcherError::MalformedResponse(_))
    ));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_single_attempt_configuration() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(clock.clone(), vec![status(503, "busy")]);
    let client = support::client(transport.clone(), clock.clone(), BUDGET).with_max_attempts(1);

    assert!(matches!(
        client.fetch(&descriptor()).await,
        Err(FetcherError::RetryExhausted { attempts: 1, .. })
    ));
    assert_eq!(transport.call_count(), 1);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_exponential_backoff_policy() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![
            status(429, "slow down"),
            status(429, "slow down"),
            status(429, "slow down"),
            success(json!([])),
        ],
    );
    let client = support::client(transport.clone(), clock.clone(), BUDGET)
        .with_max_attempts(4)
        .with_backoff(BackoffPolicy::Exponential {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(3),
        });

    client.fetch(&descriptor()).await.unwrap();

    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(3)
        ]
    );
}

#[tokio::test]
async fn test_request_url_and_query() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(clock.clone(), vec![success(json!([]))]);
    let client = support::client(transport.clone(), clock.clone(), BUDGET);

    client
        .fetch(&descriptor().param("start_time", 1_704_067_200_000i64))
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(
        calls[0].url,
        format!("{}/futures/open-interest/aggregated-history", support::TEST_BASE_URL)
    );
    assert!(calls[0].query.contains(&("symbol".to_string(), "BTC".to_string())));
    assert!(calls[0]
        .query
        .contains(&("start_time".to_string(), "1704067200000".to_string())));
}
