//! `fetch-raw` command

use clap::Args;
use tracing::warn;

use super::{Cli, CliError, OutputFormat};
use crate::config::IngestConfig;
use crate::downloader::{IngestExecutor, Job, RawJob};
use crate::fetcher::coinglass_http::CoinglassHttpClient;
use crate::fetcher::QueryValue;
use crate::registry::EndpointRegistry;
use crate::store::Store;

/// Arguments for the `fetch-raw` command
#[derive(Args, Debug)]
pub struct FetchRawArgs {
    /// Catalog endpoint name (see `endpoints`)
    pub name: String,

    /// Symbol query parameter
    #[arg(long)]
    pub symbol: Option<String>,

    /// Extra query parameter as key=value (repeatable)
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Total attempts per request
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_attempts: u32,
}

/// Parse `key=value`; integer values are sent and logged as numbers
fn parse_key_value(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{input}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{input}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

impl FetchRawArgs {
    /// Build the raw job for this invocation
    pub fn to_job(&self) -> Result<RawJob, CliError> {
        let registry =
            EndpointRegistry::load().map_err(|e| CliError::Setup(e.to_string()))?;
        let entry = registry.require(&self.name)?;

        if entry.requires_symbol() && self.symbol.is_none() {
            warn!(
                endpoint = entry.name(),
                "Endpoint expects a symbol parameter; pass --symbol"
            );
        }

        let mut job = RawJob::from_entry(entry, self.symbol.as_deref());
        for (key, value) in &self.params {
            let value = match value.parse::<i64>() {
                Ok(n) => QueryValue::Int(n),
                Err(_) => QueryValue::Text(value.clone()),
            };
            job.descriptor = job.descriptor.param(key.as_str(), value);
        }
        Ok(job)
    }

    /// Execute the fetch and append the payload to the raw log
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let config = IngestConfig {
            db_path: cli.db.clone(),
            max_attempts: self.max_attempts,
            ..IngestConfig::from_env()
        };
        config.validate()?;

        let job = self.to_job()?;
        let client = CoinglassHttpClient::from_config(&config)?;
        let store = Store::open(&config.db_path)?;
        store.ensure_schema()?;

        let mut executor = IngestExecutor::new(client, store);
        let stats = executor.run_job(&Job::Raw(job.clone())).await?;

        match cli.output_format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({
                    "endpoint": job.name,
                    "params": serde_json::to_value(job.descriptor.params())
                        .map_err(|e| CliError::Setup(e.to_string()))?,
                    "fetched": stats.fetched,
                    "inserted": stats.inserted,
                })
            ),
            OutputFormat::Human => println!(
                "Stored {} raw records from {} {}",
                stats.inserted,
                job.name,
                job.descriptor.params_json()
            ),
        }
        Ok(())
    }
}
