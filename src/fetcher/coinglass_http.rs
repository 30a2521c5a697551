//! Coinglass request executor
//!
//! Sends one logical request with:
//! - Rate limiting before every attempt
//! - Bounded retries over network failures and non-200 statuses
//! - Immediate failure on unparseable 200 bodies
//! - Envelope validation via [`ResponseValidator`]

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::downloader::clock::{SharedClock, TokioClock};
use crate::downloader::config::{BackoffPolicy, DEFAULT_MAX_ATTEMPTS};
use crate::downloader::rate_limit::RateLimiter;
use crate::fetcher::envelope::{ApiEnvelope, ResponseValidator};
use crate::fetcher::retry_formatter::{RetryContext, RetryErrorType};
use crate::fetcher::transport::{HttpTransport, ReqwestTransport};
use crate::fetcher::{FetcherError, FetcherResult, QueryValue, RequestDescriptor};
use crate::metrics::{record_rate_limit_wait, record_retry_backoff, RequestMetrics};

/// Longest response body kept in an `HttpStatusError`
const MAX_ERROR_BODY_CHARS: usize = 256;

/// HTTP client for all Coinglass API interactions
pub struct CoinglassHttpClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
    clock: SharedClock,
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl CoinglassHttpClient {
    /// Create a client over an arbitrary transport
    ///
    /// # Arguments
    /// * `transport` - Sends the actual GET requests
    /// * `base_url` - Base URL that endpoint paths are appended to
    /// * `rate_limiter` - Shared limiter consulted before every attempt
    /// * `clock` - Time source for retry backoff
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        rate_limiter: Arc<RateLimiter>,
        clock: SharedClock,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter,
            clock,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Build the production client described by a run configuration
    ///
    /// # Errors
    /// `ClientSetup` if the transport or rate limiter cannot be built
    pub fn from_config(config: &IngestConfig) -> FetcherResult<Self> {
        let clock = TokioClock::shared();
        let transport = ReqwestTransport::new(config.api_key.expose(), config.request_timeout)?;
        let rate_limiter = RateLimiter::per_minute(config.max_requests_per_minute, clock.clone())
            .map_err(|e| FetcherError::ClientSetup(e.to_string()))?;

        Ok(Self::new(
            Arc::new(transport),
            config.base_url.clone(),
            Arc::new(rate_limiter),
            clock,
        )
        .with_max_attempts(config.max_attempts)
        .with_backoff(config.backoff))
    }

    /// Set the total number of attempts per request (at least 1)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the delay policy between attempts
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Total attempts per request
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and return its parsed (unvalidated) envelope.
    ///
    /// # Errors
    /// - `MalformedResponse` immediately when a 200 body is not an envelope
    /// - `RetryExhausted` after `max_attempts` network or HTTP status failures
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> FetcherResult<ApiEnvelope> {
        let url = format!("{}{}", self.base_url, descriptor.path());
        let query = descriptor.query_pairs();
        let symbol = match descriptor.get("symbol") {
            Some(QueryValue::Text(s)) => s.clone(),
            _ => String::new(),
        };
        let date_range = match (descriptor.get("start_time"), descriptor.get("end_time")) {
            (Some(QueryValue::Int(start)), Some(QueryValue::Int(end))) => Some((*start, *end)),
            _ => None,
        };

        let mut last_error = None;
        let mut last_failure: Option<(RetryErrorType, Duration)> = None;

        for attempt in 1..=self.max_attempts {
            let waited = self.rate_limiter.acquire().await;
            if !waited.is_zero() {
                record_rate_limit_wait(waited);
            }

            debug!(
                "GET {} with {} params (attempt {}/{})",
                url,
                query.len(),
                attempt,
                self.max_attempts
            );
            let request_metrics = RequestMetrics::start(descriptor.path(), attempt);

            let (error_type, error) = match self.transport.get(&url, &query).await {
                Err(e) => {
                    request_metrics.record_network_error();
                    (e.kind, FetcherError::NetworkError(e.message))
                }
                Ok(response) if response.status != 200 => {
                    request_metrics.record_status(response.status);
                    (
                        RetryErrorType::from_status(response.status),
                        FetcherError::HttpStatusError {
                            status: response.status,
                            body: truncate_body(&response.body),
                        },
                    )
                }
                Ok(response) => {
                    request_metrics.record_status(response.status);
                    let envelope = ApiEnvelope::parse(&response.body)?;
                    if let Some((error_type, backoff)) = last_failure {
                        let context = RetryContext::new(
                            attempt,
                            self.max_attempts,
                            error_type,
                            backoff,
                            symbol.as_str(),
                            date_range,
                            "",
                            descriptor.path(),
                        );
                        info!("{}", context.format_success());
                    }
                    return Ok(envelope);
                }
            };

            let backoff = self.backoff.delay(attempt - 1);
            let context = RetryContext::new(
                attempt,
                self.max_attempts,
                error_type,
                backoff,
                symbol.as_str(),
                date_range,
                error.to_string(),
                descriptor.path(),
            );

            if attempt < self.max_attempts {
                warn!("{}", context.format_retry());
                record_retry_backoff(backoff, attempt);
                self.clock.sleep(backoff).await;
            } else {
                warn!("{}", context.format_failure());
            }

            last_error = Some(error);
            last_failure = Some((error_type, backoff));
        }

        Err(FetcherError::RetryExhausted {
            attempts: self.max_attempts,
            last: Box::new(last_error.unwrap_or_else(|| {
                FetcherError::NetworkError("no attempt was made".to_string())
            })),
        })
    }

    /// Send a request and return the validated payload records.
    ///
    /// # Errors
    /// Any error from [`execute`](Self::execute), plus `ApiError` when the
    /// envelope code is not the success sentinel (never retried)
    pub async fn fetch(&self, descriptor: &RequestDescriptor) -> FetcherResult<Vec<Value>> {
        let envelope = self.execute(descriptor).await?;
        ResponseValidator::validate(envelope)
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        truncated.push_str("...");
        truncated
    }
}
