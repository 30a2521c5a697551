//! Retry message formatting for the Coinglass request executor.
//!
//! Keeps the retry, recovery and final-failure log lines consistent and gives
//! the operator a remediation hint when a request ultimately fails.

use chrono::{DateTime, Utc};
use reqwest::{Error as ReqwestError, StatusCode};
use std::time::Duration;

/// Classification of retryable failures for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// Network timeout or connection stalled long enough to trigger a timeout
    NetworkTimeout,
    /// Connection refused, DNS failure, or other offline scenarios
    NetworkOffline,
    /// HTTP 429 rate limit exceeded
    RateLimit,
    /// HTTP 5xx server error
    ServerError(u16),
    /// Authentication failures (401/403)
    AuthFailed(u16),
    /// Any other non-200 status
    UnexpectedStatus(u16),
    /// Generic fallback when no better classification fits
    NetworkGeneric,
}

impl RetryErrorType {
    /// Classify a non-200 HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::AuthFailed(status),
            429 => Self::RateLimit,
            500..=599 => Self::ServerError(status),
            _ => Self::UnexpectedStatus(status),
        }
    }

    /// User-friendly description string used inside retry log messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "network timeout",
            Self::NetworkOffline => "connection failed",
            Self::RateLimit => "rate limit exceeded",
            Self::ServerError(code) => match code {
                500 => "internal server error",
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
            Self::AuthFailed(_) => "authentication failed",
            Self::UnexpectedStatus(code) => match code {
                404 => "resource not found",
                _ => "unexpected HTTP status",
            },
            Self::NetworkGeneric => "network error",
        }
    }

    /// Suggested remediation presented after the final failure.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "Check your network connection and firewall settings",
            Self::NetworkOffline => "Verify internet connectivity and DNS resolution",
            Self::RateLimit => "Lower --rate-limit to stay within your plan's request budget",
            Self::ServerError(_) => "Coinglass may be experiencing issues, try again later",
            Self::AuthFailed(_) => "Verify COINGLASS_API_KEY and that your plan covers this endpoint",
            Self::UnexpectedStatus(_) => "Check the endpoint path and query parameters",
            Self::NetworkGeneric => "Check network connectivity and try again",
        }
    }
}

/// Context for formatting retry messages.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Attempt number that just failed (1-based)
    pub attempt: u32,
    /// Maximum number of attempts configured
    pub max_attempts: u32,
    /// Type of error that triggered the retry
    pub error_type: RetryErrorType,
    /// Backoff duration until next attempt
    pub backoff_duration: Duration,
    /// Symbol being fetched (may be empty for catalog endpoints)
    pub symbol: String,
    /// Requested time range in millis, when bounded
    pub date_range: Option<(i64, i64)>,
    /// Original error message
    pub error_message: String,
    /// Endpoint path that failed
    pub endpoint: String,
}

impl RetryContext {
    /// Convenience constructor used by the request executor.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        attempt: u32,
        max_attempts: u32,
        error_type: RetryErrorType,
        backoff_duration: Duration,
        symbol: impl Into<String>,
        date_range: Option<(i64, i64)>,
        error_message: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            attempt,
            max_attempts,
            error_type,
            backoff_duration,
            symbol: symbol.into(),
            date_range,
            error_message: error_message.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Format standardized retry message with attempt counters and context.
    pub fn format_retry(&self) -> String {
        let mut message = format!(
            "Retrying (attempt {}/{}) after {} - waiting {:.1} seconds...",
            self.attempt + 1,
            self.max_attempts,
            self.error_type.description(),
            self.backoff_duration.as_secs_f64()
        );

        append_symbol_and_range(&mut message, &self.symbol, self.date_range);
        message
    }

    /// Format success message when a retried request eventually works.
    pub fn format_success(&self) -> String {
        let mut message = format!(
            "Retry attempt {}/{} succeeded for {} after {}",
            self.attempt,
            self.max_attempts,
            self.endpoint,
            self.error_type.description()
        );
        append_symbol_and_range(&mut message, &self.symbol, self.date_range);
        message
    }

    /// Format final failure summary with an actionable suggestion.
    pub fn format_failure(&self) -> String {
        let symbol_display = if self.symbol.is_empty() {
            "n/a"
        } else {
            &self.symbol
        };
        let range_display = self
            .date_range
            .map(|(start, end)| format!("{} to {}", format_timestamp(start), format_timestamp(end)))
            .unwrap_or_else(|| "unbounded".to_string());

        [
            format!("[FAILED] Request failed after {} attempts", self.max_attempts),
            format!("  Last error: {}", self.error_message),
            format!("  Symbol: {symbol_display}"),
            format!("  Date range: {range_display}"),
            format!("  Endpoint: {}", self.endpoint),
            format!("  Suggestion: {}", self.error_type.suggestion()),
        ]
        .join("\n")
    }
}

/// Extract a [`RetryErrorType`] from an HTTP status or reqwest error.
pub fn extract_error_type(
    status: Option<StatusCode>,
    err: Option<&ReqwestError>,
) -> RetryErrorType {
    if let Some(status) = status {
        return RetryErrorType::from_status(status.as_u16());
    }

    if let Some(err) = err {
        if err.is_timeout() {
            return RetryErrorType::NetworkTimeout;
        }

        if err.is_connect() {
            return RetryErrorType::NetworkOffline;
        }
    }

    RetryErrorType::NetworkGeneric
}

fn append_symbol_and_range(buffer: &mut String, symbol: &str, date_range: Option<(i64, i64)>) {
    if !symbol.is_empty() {
        buffer.push_str(&format!(" ({symbol})"));
    }

    if let Some((start, end)) = date_range {
        buffer.push_str(&format!(
            " {} to {}",
            format_timestamp(start),
            format_timestamp(end)
        ));
    }
}

fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| millis.to_string())
}
