//! Fetch jobs, the run plan and per-job outcomes

use serde::Serialize;
use std::fmt;

use crate::config::IngestConfig;
use crate::fetcher::coinglass_config::dataset_endpoint;
use crate::fetcher::record_mapper::MappingContext;
use crate::fetcher::RequestDescriptor;
use crate::registry::{EndpointEntry, EndpointRegistry, RegistryError};
use crate::{DatasetKind, Interval};

use super::IngestError;

/// One typed (symbol, dataset) pull
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    /// Coin symbol (e.g., "BTC")
    pub symbol: String,
    /// Dataset to pull
    pub dataset: DatasetKind,
    /// Sampling interval
    pub interval: Interval,
    /// Exchange, sent as `exchangeName` for ratio datasets
    pub exchange: Option<String>,
    /// Optional range start (ms)
    pub start_time: Option<i64>,
    /// Optional range end (ms)
    pub end_time: Option<i64>,
}

impl FetchJob {
    /// Create a job without exchange or time range
    pub fn new(symbol: impl Into<String>, dataset: DatasetKind, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            dataset,
            interval,
            exchange: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Set the exchange
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// Restrict the time range (ms)
    pub fn with_range(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// Request for this job. `exchangeName` is only sent for ratio datasets.
    pub fn descriptor(&self) -> RequestDescriptor {
        let exchange = if self.dataset.requires_exchange() {
            self.exchange.clone()
        } else {
            None
        };

        RequestDescriptor::new(dataset_endpoint(self.dataset))
            .param("symbol", self.symbol.as_str())
            .param("interval", self.interval.to_string())
            .param_opt("exchangeName", exchange)
            .param_opt("start_time", self.start_time)
            .param_opt("end_time", self.end_time)
    }

    /// Values the mapper takes from the job rather than the payload
    pub fn mapping_context(&self) -> MappingContext<'_> {
        MappingContext {
            symbol: &self.symbol,
            exchange: self.exchange.as_deref(),
        }
    }
}

/// One catalog endpoint pull, logged raw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawJob {
    /// Catalog name, stored in the `endpoint` column
    pub name: String,
    /// Request to send
    pub descriptor: RequestDescriptor,
}

impl RawJob {
    /// Job for a catalog entry, with `symbol` when given
    pub fn from_entry(entry: &EndpointEntry, symbol: Option<&str>) -> Self {
        Self {
            name: entry.name().to_string(),
            descriptor: RequestDescriptor::new(entry.path()).param_opt("symbol", symbol),
        }
    }
}

/// Any job the orchestrator can run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Typed dataset pull
    Fetch(FetchJob),
    /// Raw catalog pull
    Raw(RawJob),
}

impl Job {
    /// Metric/log label of the job's dataset
    pub fn kind_label(&self) -> &str {
        match self {
            Job::Fetch(job) => job.dataset.label(),
            Job::Raw(job) => job.name.as_str(),
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Fetch(job) => write!(f, "{} {} ({})", job.symbol, job.dataset, job.interval),
            Job::Raw(job) => match job.descriptor.get("symbol") {
                Some(symbol) => write!(f, "raw {} ({})", job.name, symbol),
                None => write!(f, "raw {}", job.name),
            },
        }
    }
}

/// Ordered list of jobs for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPlan {
    jobs: Vec<Job>,
}

impl JobPlan {
    /// Plan from an explicit job list
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    /// Standard plan for a configuration.
    ///
    /// Per symbol, in order: open interest, funding rate, top trader ratio,
    /// global ratio (when enabled), liquidations. Raw catalog jobs follow.
    ///
    /// # Errors
    /// `Registry` when a configured raw endpoint is not in the catalog.
    pub fn from_config(config: &IngestConfig) -> Result<Self, IngestError> {
        let mut datasets = vec![
            DatasetKind::OpenInterest,
            DatasetKind::FundingRate,
            DatasetKind::TopLongShortRatio,
        ];
        if config.include_global_ratio {
            datasets.push(DatasetKind::GlobalLongShortRatio);
        }
        datasets.push(DatasetKind::Liquidations);

        let symbols: Vec<&str> = config
            .symbols
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        let mut jobs = Vec::new();
        for symbol in &symbols {
            for dataset in &datasets {
                let mut job = FetchJob::new(*symbol, *dataset, config.interval)
                    .with_range(config.start_time, config.end_time);
                if dataset.requires_exchange() {
                    job = job.with_exchange(config.exchange.as_str());
                }
                jobs.push(Job::Fetch(job));
            }
        }

        if !config.raw_endpoints.is_empty() {
            let registry = EndpointRegistry::load()
                .map_err(|e| RegistryError::ParseError(e.to_string()))?;
            for name in &config.raw_endpoints {
                let entry = registry.require(name)?;
                if entry.requires_symbol() {
                    for symbol in &symbols {
                        jobs.push(Job::Raw(RawJob::from_entry(entry, Some(*symbol))));
                    }
                } else {
                    jobs.push(Job::Raw(RawJob::from_entry(entry, None)));
                }
            }
        }

        Ok(Self { jobs })
    }

    /// Append a job
    pub fn push(&mut self, job: Job) {
        self.jobs.push(job);
    }

    /// Jobs in execution order
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Number of jobs
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the plan has no jobs
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// How a job ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Payload fetched and stored
    Completed {
        /// Records in the payload
        fetched: usize,
        /// Rows newly written
        inserted: usize,
    },
    /// Any step failed; nothing from this job was stored
    Failed {
        /// Error text
        error: String,
    },
}

/// Result of one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    /// Display label of the job
    pub job: String,
    /// Final status
    #[serde(flatten)]
    pub status: JobStatus,
}

impl JobOutcome {
    /// Whether the job completed
    pub fn is_completed(&self) -> bool {
        matches!(self.status, JobStatus::Completed { .. })
    }
}

/// Outcomes of a whole run, in job order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    outcomes: Vec<JobOutcome>,
}

impl RunSummary {
    /// Record an outcome
    pub fn push(&mut self, outcome: JobOutcome) {
        self.outcomes.push(outcome);
    }

    /// All outcomes
    pub fn outcomes(&self) -> &[JobOutcome] {
        &self.outcomes
    }

    /// Completed jobs
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_completed()).count()
    }

    /// Failed jobs
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }

    /// Rows newly written across all jobs
    pub fn inserted(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                JobStatus::Completed { inserted, .. } => inserted,
                JobStatus::Failed { .. } => 0,
            })
            .sum()
    }
}
