//! Ingestion metrics
//!
//! Counters and histograms are emitted through the `metrics` facade. They are
//! no-ops until [`init_metrics`] installs the Prometheus exporter, so library
//! code can record unconditionally.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::{debug, info};

static METRICS_INITIALIZED: OnceCell<SocketAddr> = OnceCell::new();

/// Install the Prometheus exporter and register metric descriptions.
///
/// Idempotent: later calls return `Ok` without rebinding.
///
/// # Errors
/// Returns an error if the exporter cannot bind `addr`
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INITIALIZED.get().is_some() {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "coinglass_requests_total",
        Unit::Count,
        "HTTP attempts sent to the Coinglass API"
    );
    describe_counter!(
        "coinglass_retries_total",
        Unit::Count,
        "Retry backoffs taken after retryable failures"
    );
    describe_histogram!(
        "coinglass_request_duration_seconds",
        Unit::Seconds,
        "Duration of a single HTTP attempt"
    );
    describe_histogram!(
        "coinglass_rate_limit_wait_seconds",
        Unit::Seconds,
        "Time spent waiting on the rate limiter"
    );
    describe_counter!(
        "store_rows_inserted_total",
        Unit::Count,
        "Rows newly written to the store"
    );
    describe_counter!(
        "ingest_jobs_completed_total",
        Unit::Count,
        "Jobs that completed successfully"
    );
    describe_counter!(
        "ingest_jobs_failed_total",
        Unit::Count,
        "Jobs that failed and were skipped"
    );

    let _ = METRICS_INITIALIZED.set(addr);
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

/// Whether the exporter has been installed
pub fn is_initialized() -> bool {
    METRICS_INITIALIZED.get().is_some()
}

/// Timing for one HTTP attempt
pub struct RequestMetrics {
    endpoint: String,
    attempt: u32,
    start_time: Instant,
}

impl RequestMetrics {
    /// Start timing an attempt
    pub fn start(endpoint: impl Into<String>, attempt: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            attempt,
            start_time: Instant::now(),
        }
    }

    /// Record an attempt that produced an HTTP status
    pub fn record_status(&self, status: u16) {
        self.record(status.to_string());
    }

    /// Record an attempt that failed below HTTP
    pub fn record_network_error(&self) {
        self.record("network_error".to_string());
    }

    fn record(&self, outcome: String) {
        let duration = self.start_time.elapsed();
        counter!(
            "coinglass_requests_total",
            "endpoint" => self.endpoint.clone(),
            "status" => outcome.clone(),
        )
        .increment(1);
        histogram!(
            "coinglass_request_duration_seconds",
            "endpoint" => self.endpoint.clone(),
        )
        .record(duration.as_secs_f64());

        debug!(
            endpoint = %self.endpoint,
            attempt = self.attempt,
            status = %outcome,
            duration_ms = duration.as_millis() as u64,
            "HTTP attempt finished"
        );
    }
}

/// Record a retry backoff
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!("coinglass_retries_total", "attempt" => attempt.to_string()).increment(1);
    debug!(
        attempt = attempt,
        backoff_ms = duration.as_millis() as u64,
        "Retry backoff recorded"
    );
}

/// Record time spent waiting on the rate limiter
pub fn record_rate_limit_wait(duration: Duration) {
    histogram!("coinglass_rate_limit_wait_seconds").record(duration.as_secs_f64());
}

/// Record rows newly inserted into a table
pub fn record_rows_inserted(table: &str, rows: usize) {
    counter!("store_rows_inserted_total", "table" => table.to_string()).increment(rows as u64);
}

/// Record a job outcome
pub fn record_job_outcome(dataset: &str, success: bool) {
    if success {
        counter!("ingest_jobs_completed_total", "dataset" => dataset.to_string()).increment(1);
    } else {
        counter!("ingest_jobs_failed_total", "dataset" => dataset.to_string()).increment(1);
    }
}
