//! HTTP transport seam
//!
//! [`CoinglassHttpClient`](super::coinglass_http::CoinglassHttpClient) talks to
//! the network only through [`HttpTransport`], so retry behavior can be driven
//! by scripted responses in tests.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::time::Duration;

use super::coinglass_config::API_KEY_HEADER;
use super::retry_formatter::{extract_error_type, RetryErrorType};
use super::{FetcherError, FetcherResult};

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Convenience constructor
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport-level failure (no HTTP status available)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    /// Classification used for retry messages
    pub kind: RetryErrorType,
    /// Underlying error text
    pub message: String,
}

impl TransportError {
    /// Create a transport error
    pub fn new(kind: RetryErrorType, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Sends one GET request
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform a GET against `url` with the given query pairs
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by `reqwest`
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client that sends the API key and JSON accept header on every request
    ///
    /// # Errors
    /// Returns `FetcherError::ClientSetup` if the key is not a valid header value
    /// or the TLS backend fails to initialize
    pub fn new(api_key: &str, timeout: Duration) -> FetcherResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| FetcherError::ClientSetup(format!("invalid API key header: {e}")))?;
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetcherError::ClientSetup(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::new(extract_error_type(None, Some(&e)), e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(extract_error_type(None, Some(&e)), e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
