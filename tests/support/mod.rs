//! Shared fixtures: a scripted transport and a client wired to a manual clock

#![allow(dead_code)]

use async_trait::async_trait;
use coinglass_ingest::downloader::clock::{ManualClock, SharedClock};
use coinglass_ingest::downloader::RateLimiter;
use coinglass_ingest::fetcher::coinglass_http::CoinglassHttpClient;
use coinglass_ingest::fetcher::retry_formatter::RetryErrorType;
use coinglass_ingest::fetcher::transport::{HttpResponse, HttpTransport, TransportError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const TEST_BASE_URL: &str = "https://coinglass.test/api";

/// One recorded GET
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub at: std::time::Duration,
}

/// Replays queued results in order and records every request it sees.
/// Once the script runs dry every further call is a network failure.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    clock: Arc<ManualClock>,
}

impl ScriptedTransport {
    pub fn new(
        clock: Arc<ManualClock>,
        script: Vec<Result<HttpResponse, TransportError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            clock,
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        use coinglass_ingest::downloader::clock::Clock;

        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            query: query.to_vec(),
            at: self.clock.now(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(network_failure("script exhausted")))
    }
}

/// 200 response carrying a success envelope around `data`
pub fn success(data: Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(
        200,
        json!({"code": "0", "msg": "success", "data": data}).to_string(),
    ))
}

/// 200 response carrying an application-level failure
pub fn api_failure(code: &str, msg: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(
        200,
        json!({"code": code, "msg": msg}).to_string(),
    ))
}

pub fn status(code: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(code, body))
}

pub fn network_failure(message: &str) -> TransportError {
    TransportError::new(RetryErrorType::NetworkOffline, message)
}

/// Client over `transport` with a limiter and backoff driven by `clock`
pub fn client(
    transport: Arc<ScriptedTransport>,
    clock: Arc<ManualClock>,
    max_requests_per_minute: u32,
) -> CoinglassHttpClient {
    let shared: SharedClock = clock;
    let limiter = RateLimiter::per_minute(max_requests_per_minute, shared.clone()).unwrap();
    CoinglassHttpClient::new(transport, TEST_BASE_URL, Arc::new(limiter), shared)
}

/// Open interest style OHLC payload
pub fn ohlc_payload(times: &[i64]) -> Value {
    Value::Array(
        times
            .iter()
            .map(|t| json!({"time": t, "open": "100.5", "high": "110", "low": 95.25, "close": "101"}))
            .collect(),
    )
}
