//! `ingest` command

use chrono::{DateTime, NaiveDate};
use clap::Args;
use std::net::SocketAddr;
use tracing::info;

use super::{Cli, CliError, OutputFormat};
use crate::config::{IngestConfig, DEFAULT_RAW_ENDPOINTS};
use crate::downloader::progress::job_progress_bar;
use crate::downloader::{IngestExecutor, JobPlan, JobStatus, RunSummary};
use crate::fetcher::coinglass_config::DEFAULT_EXCHANGE;
use crate::fetcher::coinglass_http::CoinglassHttpClient;
use crate::metrics::init_metrics;
use crate::store::Store;
use crate::Interval;

/// Try to parse an RFC3339 datetime, assuming UTC when no offset is given.
///
/// Returns the timestamp in milliseconds.
fn try_parse_datetime_rfc3339(input: &str) -> Option<i64> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.timestamp_millis());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&format!("{input}Z")) {
        return Some(dt.timestamp_millis());
    }

    None
}

/// Parse a start time: milliseconds, RFC3339, or YYYY-MM-DD (start of day UTC)
pub fn parse_start_time(input: &str) -> Result<i64, CliError> {
    if let Ok(ms) = input.trim().parse::<i64>() {
        return Ok(ms);
    }
    if let Some(ts) = try_parse_datetime_rfc3339(input) {
        return Ok(ts);
    }

    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| CliError::InvalidArgument(format!("Invalid start time: {e}")))?;
    let datetime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CliError::InvalidArgument("Invalid start time".to_string()))?;
    Ok(datetime.and_utc().timestamp_millis())
}

/// Parse an end time: milliseconds, RFC3339, or YYYY-MM-DD (end of day UTC,
/// so the date is fully included)
pub fn parse_end_time(input: &str) -> Result<i64, CliError> {
    if let Ok(ms) = input.trim().parse::<i64>() {
        return Ok(ms);
    }
    if let Some(ts) = try_parse_datetime_rfc3339(input) {
        return Ok(ts);
    }

    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| CliError::InvalidArgument(format!("Invalid end time: {e}")))?;
    let datetime = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| CliError::InvalidArgument("Invalid end time".to_string()))?;
    Ok(datetime.and_utc().timestamp_millis())
}

/// Arguments for the `ingest` command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Symbols to fetch (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "BTC,ETH")]
    pub symbols: Vec<String>,

    /// Sampling interval (Hobbyist plan: 4h or above)
    #[arg(long, default_value = "4h")]
    pub interval: Interval,

    /// Exchange for the long/short ratio datasets
    #[arg(long, default_value = DEFAULT_EXCHANGE)]
    pub exchange: String,

    /// Range start (ms, RFC3339 or YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Range end (ms, RFC3339 or YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Total attempts per request
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_attempts: u32,

    /// Request budget per minute
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..))]
    pub rate_limit: u32,

    /// Also fetch the global-account long/short ratio
    #[arg(long, default_value_t = false)]
    pub include_global_ratio: bool,

    /// Catalog endpoint to log raw after the typed jobs (repeatable;
    /// defaults to the futures supported coins and exchange pairs lists)
    #[arg(long = "raw-endpoint")]
    pub raw_endpoints: Vec<String>,

    /// Skip raw catalog endpoints entirely
    #[arg(long, default_value_t = false, conflicts_with = "raw_endpoints")]
    pub no_raw: bool,

    /// Serve Prometheus metrics on this address during the run
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl IngestArgs {
    /// Build the run configuration from defaults, environment and flags
    pub fn to_config(&self, cli: &Cli) -> Result<IngestConfig, CliError> {
        let raw_endpoints = if self.no_raw {
            Vec::new()
        } else if self.raw_endpoints.is_empty() {
            DEFAULT_RAW_ENDPOINTS.iter().map(|s| s.to_string()).collect()
        } else {
            self.raw_endpoints.clone()
        };

        Ok(IngestConfig {
            db_path: cli.db.clone(),
            symbols: self
                .symbols
                .iter()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            interval: self.interval,
            exchange: self.exchange.clone(),
            start_time: self.start.as_deref().map(parse_start_time).transpose()?,
            end_time: self.end.as_deref().map(parse_end_time).transpose()?,
            max_attempts: self.max_attempts,
            max_requests_per_minute: self.rate_limit,
            include_global_ratio: self.include_global_ratio,
            raw_endpoints,
            ..IngestConfig::from_env()
        })
    }

    /// Execute the ingest run
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let config = self.to_config(cli)?;
        config.validate()?;

        if let Some(addr) = self.metrics_addr {
            init_metrics(addr).map_err(|e| CliError::Setup(e.to_string()))?;
        }

        let client = CoinglassHttpClient::from_config(&config)?;
        let store = Store::open(&config.db_path)?;
        store.ensure_schema()?;

        let plan = JobPlan::from_config(&config)?;
        info!(
            symbols = ?config.symbols,
            interval = %config.interval,
            jobs = plan.len(),
            db = %config.db_path.display(),
            "Ingest plan ready"
        );

        let mut executor = IngestExecutor::new(client, store);
        if !self.no_progress {
            executor = executor.with_progress(job_progress_bar(plan.len()));
        }
        let summary = executor.run(&plan).await;

        print_summary(&summary, cli.output_format)
    }
}

fn print_summary(summary: &RunSummary, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(summary)
                .map_err(|e| CliError::Setup(format!("Failed to serialize summary: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Human => {
            println!(
                "Completed {}/{} jobs, {} new rows",
                summary.completed(),
                summary.outcomes().len(),
                summary.inserted()
            );
            for outcome in summary.outcomes() {
                match &outcome.status {
                    JobStatus::Completed { fetched, inserted } => {
                        println!("  ok     {} ({fetched} fetched, {inserted} new)", outcome.job)
                    }
                    JobStatus::Failed { error } => {
                        println!("  failed {}: {error}", outcome.job)
                    }
                }
            }
        }
    }
    Ok(())
}
