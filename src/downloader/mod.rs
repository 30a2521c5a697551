//! Ingest orchestration and rate limiting
//!
//! # Overview
//!
//! 1. **Planning**: [`JobPlan::from_config`] lists the (symbol, dataset) jobs and raw catalog pulls
//! 2. **Execution**: [`IngestExecutor::run`] drives each job through fetch, map and store
//! 3. **Rate Limiting**: [`RateLimiter`] spaces every outbound request
//! 4. **Timing**: all waits go through a [`clock::Clock`], replaceable in tests
//!
//! # Quick Start
//!
//! ```no_run
//! use coinglass_ingest::config::IngestConfig;
//! use coinglass_ingest::downloader::{IngestExecutor, JobPlan};
//! use coinglass_ingest::fetcher::coinglass_http::CoinglassHttpClient;
//! use coinglass_ingest::store::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IngestConfig::from_env();
//! let store = Store::open(&config.db_path)?;
//! store.ensure_schema()?;
//!
//! let mut executor = IngestExecutor::new(CoinglassHttpClient::from_config(&config)?, store);
//! let summary = executor.run(&JobPlan::from_config(&config)?).await;
//! assert_eq!(summary.outcomes().len(), summary.completed() + summary.failed());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Job failures surface as [`IngestError`] from [`IngestExecutor::run_job`];
//! [`IngestExecutor::run`] logs them and moves on.

pub mod clock;
pub mod config;
pub mod executor;
pub mod job;
pub mod progress;
pub mod rate_limit;

pub use executor::{IngestExecutor, JobStats};
pub use job::{FetchJob, Job, JobOutcome, JobPlan, JobStatus, RawJob, RunSummary};
pub use rate_limit::{RateLimitError, RateLimiter};

use crate::config::ConfigError;
use crate::fetcher::FetcherError;
use crate::registry::RegistryError;
use crate::store::StoreError;

/// Ingest errors
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Request, validation or mapping failure
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetcherError),

    /// Persistence failure
    #[error("store failed: {0}")]
    Store(#[from] StoreError),

    /// Unknown catalog endpoint
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid rate budget
    #[error("rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),
}
