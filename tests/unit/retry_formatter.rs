//! Retry message formatting

use coinglass_ingest::fetcher::retry_formatter::{RetryContext, RetryErrorType};
use std::time::Duration;

fn context(error_type: RetryErrorType, symbol: &str) -> RetryContext {
    RetryContext::new(
        1,
        3,
        error_type,
        Duration::from_secs(2),
        symbol,
        Some((1_704_067_200_000, 1_704_153_600_000)),
        "HTTP status 503: upstream unavailable",
        "/futures/open-interest/aggregated-history",
    )
}

#[test]
fn test_retry_message_counts_next_attempt() {
    let message = context(RetryErrorType::ServerError(503), "BTC").format_retry();
    assert!(message.contains("attempt 2/3"), "{message}");
    assert!(message.contains("service unavailable"), "{message}");
    assert!(message.contains("2.0 seconds"), "{message}");
    assert!(message.contains("(BTC)"), "{message}");
}

#[test]
fn test_success_message_names_recovered_error() {
    let mut ctx = context(RetryErrorType::RateLimit, "ETH");
    ctx.attempt = 2;
    let message = ctx.format_success();
    assert!(message.contains("attempt 2/3 succeeded"), "{message}");
    assert!(message.contains("after rate limit exceeded"), "{message}");
    assert!(message.contains("(ETH)"), "{message}");
}

#[test]
fn test_failure_summary_lists_context() {
    let message = context(RetryErrorType::RateLimit, "").format_failure();
    assert!(message.contains("failed after 3 attempts"), "{message}");
    assert!(message.contains("Symbol: n/a"), "{message}");
    assert!(message.contains("/futures/open-interest/aggregated-history"), "{message}");
    assert!(message.contains("--rate-limit"), "{message}");
}

#[test]
fn test_status_classes() {
    assert_eq!(RetryErrorType::from_status(401), RetryErrorType::AuthFailed(401));
    assert_eq!(RetryErrorType::from_status(429), RetryErrorType::RateLimit);
    assert_eq!(RetryErrorType::from_status(502), RetryErrorType::ServerError(502));
    assert_eq!(RetryErrorType::from_status(404), RetryErrorType::UnexpectedStatus(404));
    assert_eq!(
        RetryErrorType::from_status(404).description(),
        "resource not found"
    );
}
