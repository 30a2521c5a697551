//! Run configuration
//!
//! Everything a run needs is carried in an explicit [`IngestConfig`] value and
//! handed to constructors. The only environment lookup is the API key.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::downloader::config::{
    BackoffPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_REQUESTS_PER_MINUTE, DEFAULT_REQUEST_TIMEOUT,
};
use crate::fetcher::coinglass_config::{
    API_KEY_ENV, API_KEY_PLACEHOLDER, DEFAULT_BASE_URL, DEFAULT_EXCHANGE,
};
use crate::Interval;

/// Default SQLite database file
pub const DEFAULT_DB_PATH: &str = "coinglass_data.db";

/// Symbols pulled when none are given
pub const DEFAULT_SYMBOLS: [&str; 2] = ["BTC", "ETH"];

/// Catalog endpoints logged raw on every run
pub const DEFAULT_RAW_ENDPOINTS: [&str; 2] =
    ["futures_supported_coins", "futures_supported_exchange_pairs"];

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Request budget of zero
    #[error("max requests per minute must be at least 1")]
    ZeroRequestBudget,

    /// Zero attempts configured
    #[error("max attempts must be at least 1")]
    ZeroAttempts,

    /// No symbols to fetch
    #[error("symbol list is empty")]
    NoSymbols,

    /// Start after end
    #[error("start time ({start}) is after end time ({end})")]
    InvalidTimeRange {
        /// Start (ms)
        start: i64,
        /// End (ms)
        end: i64,
    },
}

/// Coinglass API key. `Debug` never prints the secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key value
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from `COINGLASS_API_KEY`.
    ///
    /// A missing, empty or placeholder key only produces a warning; requests
    /// will then be rejected by the API itself.
    pub fn from_env() -> Self {
        let key = Self(std::env::var(API_KEY_ENV).unwrap_or_default());
        if !key.is_configured() {
            warn!(
                "Coinglass API key is not set. Export {} before running an ingest.",
                API_KEY_ENV
            );
        }
        key
    }

    /// Whether the key looks usable (non-empty, not the placeholder)
    pub fn is_configured(&self) -> bool {
        let key = self.0.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }

    /// Raw key value for the request header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_configured() {
            f.write_str("ApiKey(***)")
        } else {
            f.write_str("ApiKey(<unset>)")
        }
    }
}

/// Configuration for one ingest run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// API key sent as `CG-API-KEY`
    pub api_key: ApiKey,
    /// Base URL endpoint paths are appended to
    pub base_url: String,
    /// Request budget
    pub max_requests_per_minute: u32,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Total attempts per request
    pub max_attempts: u32,
    /// Delay between attempts
    pub backoff: BackoffPolicy,
    /// SQLite database file
    pub db_path: PathBuf,
    /// Symbols to fetch, in order
    pub symbols: Vec<String>,
    /// Sampling interval
    pub interval: Interval,
    /// Exchange for the long/short ratio datasets
    pub exchange: String,
    /// Optional range start (ms)
    pub start_time: Option<i64>,
    /// Optional range end (ms)
    pub end_time: Option<i64>,
    /// Also fetch the global-account long/short ratio
    pub include_global_ratio: bool,
    /// Catalog endpoints appended to the raw log after the typed jobs
    pub raw_endpoints: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_key: ApiKey::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_requests_per_minute: DEFAULT_MAX_REQUESTS_PER_MINUTE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: BackoffPolicy::default(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            interval: Interval::FourHours,
            exchange: DEFAULT_EXCHANGE.to_string(),
            start_time: None,
            end_time: None,
            include_global_ratio: false,
            raw_endpoints: DEFAULT_RAW_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl IngestConfig {
    /// Defaults plus the API key from the environment
    pub fn from_env() -> Self {
        Self {
            api_key: ApiKey::from_env(),
            ..Self::default()
        }
    }

    /// Check the values a run cannot proceed without.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests_per_minute == 0 {
            return Err(ConfigError::ZeroRequestBudget);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::NoSymbols);
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err(ConfigError::InvalidTimeRange { start, end });
            }
        }
        if !self.interval.is_hobbyist_allowed() {
            warn!(
                interval = %self.interval,
                "Interval below 4h is rejected on the Hobbyist plan"
            );
        }
        Ok(())
    }
}
