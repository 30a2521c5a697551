//! End-to-end job runs over a scripted API and an in-memory store

use crate::support::{self, api_failure, ohlc_payload, success, ScriptedTransport};
use coinglass_ingest::config::IngestConfig;
use coinglass_ingest::downloader::clock::ManualClock;
use coinglass_ingest::downloader::{FetchJob, IngestExecutor, Job, JobPlan, JobStatus, RawJob};
use coinglass_ingest::registry::EndpointRegistry;
use coinglass_ingest::store::Store;
use coinglass_ingest::{DatasetKind, Interval};
use serde_json::json;

fn store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    store
}

fn mixed_plan() -> JobPlan {
    let registry = EndpointRegistry::load().unwrap();
    JobPlan::new(vec![
        Job::Fetch(FetchJob::new("BTC", DatasetKind::OpenInterest, Interval::FourHours)),
        Job::Fetch(FetchJob::new("BTC", DatasetKind::FundingRate, Interval::FourHours)),
        Job::Fetch(FetchJob::new("ETH", DatasetKind::Liquidations, Interval::FourHours)),
        Job::Raw(RawJob::from_entry(
            registry.require("futures_supported_coins").unwrap(),
            None,
        )),
    ])
}

#[tokio::test]
async fn test_failed_jobs_do_not_stop_the_run() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![
            success(ohlc_payload(&[1_704_067_200_000, 1_704_081_600_000])),
            api_failure("30001", "upgrade your plan"),
            // second record lacks `time`
            success(json!([{"time": 1, "aggregated_long_liquidation_usd": 5}, {"aggregated_long_liquidation_usd": 7}])),
            success(json!(["BTC", "ETH"])),
        ],
    );
    let client = support::client(transport.clone(), clock.clone(), 600);
    let mut executor = IngestExecutor::new(client, store());

    let summary = executor.run(&mixed_plan()).await;

    assert_eq!(transport.call_count(), 4);
    assert_eq!(summary.completed(), 2);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.inserted(), 4);

    let outcomes = summary.outcomes();
    assert_eq!(outcomes[0].job, "BTC open_interest (4h)");
    assert!(matches!(
        outcomes[1].status,
        JobStatus::Failed { ref error } if error.contains("upgrade your plan")
    ));
    assert!(matches!(
        outcomes[2].status,
        JobStatus::Failed { ref error } if error.contains("record 1")
    ));

    let store = executor.store();
    assert_eq!(store.count_rows("open_interest").unwrap(), 2);
    assert_eq!(store.count_rows("funding_rate").unwrap(), 0);
    // A malformed record rejects the whole payload
    assert_eq!(store.count_rows("liquidations").unwrap(), 0);
    assert_eq!(store.count_rows("raw_api_data").unwrap(), 2);
}

#[tokio::test]
async fn test_rerun_inserts_no_duplicate_typed_rows() {
    let clock = ManualClock::shared();
    let payload = ohlc_payload(&[1, 2, 3]);
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![success(payload.clone()), success(payload)],
    );
    let client = support::client(transport, clock, 600);
    let mut executor = IngestExecutor::new(client, store());
    let plan = JobPlan::new(vec![Job::Fetch(FetchJob::new(
        "SOL",
        DatasetKind::FundingRate,
        Interval::OneDay,
    ))]);

    let first = executor.run(&plan).await;
    let second = executor.run(&plan).await;

    assert_eq!(first.inserted(), 3);
    assert_eq!(second.inserted(), 0);
    assert_eq!(second.completed(), 1);
    assert_eq!(executor.store().count_rows("funding_rate").unwrap(), 3);
}

#[tokio::test]
async fn test_ratio_job_sends_exchange_and_stores_category() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![success(json!([{
            "time": 10,
            "top_account_long_percent": "70",
            "top_account_short_percent": "30",
            "top_account_long_short_ratio": "2.33"
        }]))],
    );
    let client = support::client(transport.clone(), clock, 600);
    let mut executor = IngestExecutor::new(client, store());
    let job = FetchJob::new("BTC", DatasetKind::TopLongShortRatio, Interval::FourHours)
        .with_exchange("Binance")
        .with_range(Some(0), Some(100));

    let stats = executor.run_job(&Job::Fetch(job)).await.unwrap();
    assert_eq!(stats.inserted, 1);

    let query = &transport.calls()[0].query;
    assert!(query.contains(&("exchangeName".to_string(), "Binance".to_string())));
    assert!(query.contains(&("end_time".to_string(), "100".to_string())));

    let rows = executor.store().select_rows("long_short_ratio", None).unwrap();
    let rendered: Vec<Vec<String>> = rows.rendered().collect();
    let category = rows.columns.iter().position(|c| c == "category").unwrap();
    assert_eq!(rendered[0][category], "top");
}

#[tokio::test]
async fn test_raw_job_logs_params() {
    let clock = ManualClock::shared();
    let transport = ScriptedTransport::new(
        clock.clone(),
        vec![success(json!({"max_pain": 60000}))],
    );
    let client = support::client(transport, clock, 600);
    let mut executor = IngestExecutor::new(client, store());
    let registry = EndpointRegistry::load().unwrap();
    let job = RawJob::from_entry(registry.require("option_max_pain").unwrap(), Some("BTC"));

    let stats = executor.run_job(&Job::Raw(job)).await.unwrap();
    assert_eq!(stats.fetched, 1);

    let rows = executor.store().raw_records("option_max_pain").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].params, r#"{"symbol":"BTC"}"#);
    assert_eq!(rows[0].data, r#"{"max_pain":60000}"#);
}

#[test]
fn test_plan_from_config_order() {
    let config = IngestConfig {
        symbols: vec!["BTC".to_string(), " ".to_string(), "ETH".to_string()],
        include_global_ratio: true,
        raw_endpoints: vec![
            "futures_supported_coins".to_string(),
            "option_max_pain".to_string(),
        ],
        ..IngestConfig::default()
    };

    let plan = JobPlan::from_config(&config).unwrap();
    let labels: Vec<String> = plan.jobs().iter().map(|j| j.to_string()).collect();

    assert_eq!(
        labels,
        vec![
            "BTC open_interest (4h)",
            "BTC funding_rate (4h)",
            "BTC top_long_short_ratio (4h)",
            "BTC global_long_short_ratio (4h)",
            "BTC liquidations (4h)",
            "ETH open_interest (4h)",
            "ETH funding_rate (4h)",
            "ETH top_long_short_ratio (4h)",
            "ETH global_long_short_ratio (4h)",
            "ETH liquidations (4h)",
            "raw futures_supported_coins",
            "raw option_max_pain (BTC)",
            "raw option_max_pain (ETH)",
        ]
    );
}

#[test]
fn test_plan_rejects_unknown_raw_endpoint() {
    let config = IngestConfig {
        raw_endpoints: vec!["not_in_catalog".to_string()],
        ..IngestConfig::default()
    };
    assert!(JobPlan::from_config(&config).is_err());
}
