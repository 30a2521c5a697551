//! Request execution, envelope validation and record mapping
//!
//! Control flow for one logical request:
//! [`coinglass_http::CoinglassHttpClient::execute`] (rate limit, send, retry)
//! → [`envelope::ResponseValidator::validate`] → [`record_mapper::RecordMapper::map`].

use serde::Serialize;
use std::collections::BTreeMap;

pub mod coinglass_config;
pub mod coinglass_http;
pub mod envelope;
pub mod record_mapper;
pub mod retry_formatter;
pub mod transport;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Transport-level failure (DNS, connection reset, timeout)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Non-200 HTTP response
    #[error("HTTP status {status}: {body}")]
    HttpStatusError {
        /// Response status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// 200 response whose body is not a JSON envelope
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Envelope code is not the success sentinel
    #[error("API error (code {code}): {message}")]
    ApiError {
        /// Envelope status code
        code: String,
        /// Envelope message
        message: String,
    },

    /// All attempts consumed by retryable failures
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Attempts made
        attempts: u32,
        /// Failure of the final attempt
        last: Box<FetcherError>,
    },

    /// Mandatory record field missing or unreadable
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// HTTP client could not be constructed
    #[error("client setup error: {0}")]
    ClientSetup(String),
}

impl FetcherError {
    /// Whether the request executor retries this failure
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetcherError::NetworkError(_) | FetcherError::HttpStatusError { .. }
        )
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Scalar query parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// Text value
    Text(String),
    /// Integer value (e.g., millisecond timestamps)
    Int(i64),
}

impl std::fmt::Display for QueryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryValue::Text(s) => f.write_str(s),
            QueryValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

/// Path plus query parameters for one GET request.
///
/// Built fresh per call and not mutated once handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestDescriptor {
    path: String,
    params: BTreeMap<String, QueryValue>,
}

impl RequestDescriptor {
    /// Start a descriptor for an endpoint path (relative to the base URL)
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter only when a value is present
    pub fn param_opt<V: Into<QueryValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Endpoint path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters
    pub fn params(&self) -> &BTreeMap<String, QueryValue> {
        &self.params
    }

    /// Look up a parameter
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.get(key)
    }

    /// Parameters rendered as string pairs for the transport
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    /// Parameters serialized as a JSON object (raw log `params` column)
    pub fn params_json(&self) -> String {
        serde_json::to_string(&self.params).unwrap_or_else(|_| "{}".to_string())
    }
}
