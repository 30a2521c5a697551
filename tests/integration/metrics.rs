//! Prometheus exporter wiring
//!
//! The exporter is process-global, so everything that needs it lives in one test.

use crate::support::{self, status, success, ScriptedTransport};
use coinglass_ingest::downloader::clock::ManualClock;
use coinglass_ingest::downloader::{FetchJob, IngestExecutor, Job, JobPlan};
use coinglass_ingest::metrics;
use coinglass_ingest::store::Store;
use coinglass_ingest::{DatasetKind, Interval};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;

async fn scrape(addr: SocketAddr) -> Option<String> {
    let url = format!("http://{addr}/metrics");
    for _ in 0..20 {
        if let Ok(resp) = reqwest::get(&url).await {
            if resp.status().is_success() {
                return resp.text().await.ok();
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    None
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_exporter_reports_ingest_activity() {
    let addr: SocketAddr = "127.0.0.1:19391".parse().unwrap();
    metrics::init_metrics(addr).unwrap();
    // Second call is a no-op
    metrics::init_metrics(addr).unwrap();
    assert!(metrics::is_initialized());

    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![
            status(503, "busy"),
            success(json!([{"time": 1, "aggregated_long_liquidation_usd": "10"}])),
        ],
    );
    let client = support::client(transport, clock, 600);
    let store = Store::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    let mut executor = IngestExecutor::new(client, store);
    let plan = JobPlan::new(vec![Job::Fetch(FetchJob::new(
        "BTC",
        DatasetKind::Liquidations,
        Interval::FourHours,
    ))]);
    let summary = executor.run(&plan).await;
    assert_eq!(summary.completed(), 1);

    let body = scrape(addr).await.expect("metrics endpoint did not answer");
    assert!(body.contains("coinglass_requests_total"), "{body}");
    assert!(body.contains("coinglass_retries_total"), "{body}");
    assert!(body.contains("store_rows_inserted_total"), "{body}");
    assert!(body.contains("ingest_jobs_completed_total"), "{body}");
}
