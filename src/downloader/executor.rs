//! Ingest executor: the per-run orchestrator
//!
//! Runs every job of a [`JobPlan`] in order, one at a time, as
//! fetch → validate → map → store. A failing job is logged and recorded in the
//! [`RunSummary`]; it never stops the run.

use indicatif::ProgressBar;
use tracing::{error, info, warn};

use crate::downloader::job::{FetchJob, Job, JobOutcome, JobPlan, JobStatus, RawJob, RunSummary};
use crate::downloader::IngestError;
use crate::fetcher::coinglass_http::CoinglassHttpClient;
use crate::fetcher::record_mapper::RecordMapper;
use crate::metrics::{record_job_outcome, record_rows_inserted};
use crate::store::Store;
use crate::Table;

/// Counts for one completed job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobStats {
    /// Records in the payload
    pub fetched: usize,
    /// Rows newly written
    pub inserted: usize,
}

/// Orchestrates a run over one client and one store
pub struct IngestExecutor {
    client: CoinglassHttpClient,
    store: Store,
    progress: Option<ProgressBar>,
}

impl IngestExecutor {
    /// Create an executor
    pub fn new(client: CoinglassHttpClient, store: Store) -> Self {
        Self {
            client,
            store,
            progress: None,
        }
    }

    /// Report progress on a terminal bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Store written by this executor
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Give back the client and store
    pub fn into_parts(self) -> (CoinglassHttpClient, Store) {
        (self.client, self.store)
    }

    /// Run every job in plan order and summarize the outcomes.
    pub async fn run(&mut self, plan: &JobPlan) -> RunSummary {
        info!(jobs = plan.len(), "Starting ingest run");
        let mut summary = RunSummary::default();

        for job in plan.jobs() {
            let label = job.to_string();
            if let Some(pb) = &self.progress {
                pb.set_message(label.clone());
            }

            let status = match self.run_job(job).await {
                Ok(stats) => {
                    record_job_outcome(job.kind_label(), true);
                    JobStatus::Completed {
                        fetched: stats.fetched,
                        inserted: stats.inserted,
                    }
                }
                Err(e) => {
                    record_job_outcome(job.kind_label(), false);
                    error!(job = %label, error = %e, "Job failed, continuing with next job");
                    JobStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            summary.push(JobOutcome { job: label, status });

            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_with_message("done");
        }

        if summary.failed() > 0 {
            warn!(
                completed = summary.completed(),
                failed = summary.failed(),
                inserted = summary.inserted(),
                "Ingest run finished with failures"
            );
        } else {
            info!(
                completed = summary.completed(),
                inserted = summary.inserted(),
                "Ingest run completed"
            );
        }
        summary
    }

    /// Run a single job.
    ///
    /// # Errors
    /// The first failure among fetch, validation, mapping and storage.
    /// Mapping runs over the whole payload before anything is written, so a
    /// malformed record leaves the store untouched.
    pub async fn run_job(&mut self, job: &Job) -> Result<JobStats, IngestError> {
        match job {
            Job::Fetch(job) => self.run_fetch(job).await,
            Job::Raw(job) => self.run_raw(job).await,
        }
    }

    async fn run_fetch(&mut self, job: &FetchJob) -> Result<JobStats, IngestError> {
        let payload = self.client.fetch(&job.descriptor()).await?;
        let rows = RecordMapper::map_all(job.dataset, &job.mapping_context(), &payload)?;

        let table = job.dataset.table();
        let inserted = self.store.upsert_typed(table, &rows)?;
        record_rows_inserted(table.name(), inserted);

        info!(
            symbol = %job.symbol,
            dataset = %job.dataset,
            fetched = payload.len(),
            inserted = inserted,
            "Stored {} {} records for {}",
            inserted,
            job.dataset,
            job.symbol
        );

        Ok(JobStats {
            fetched: payload.len(),
            inserted,
        })
    }

    async fn run_raw(&mut self, job: &RawJob) -> Result<JobStats, IngestError> {
        let payload = self.client.fetch(&job.descriptor).await?;
        let inserted =
            self.store
                .append_raw(&job.name, &job.descriptor.params_json(), &payload)?;
        record_rows_inserted(Table::RawApiData.name(), inserted);

        Ok(JobStats {
            fetched: payload.len(),
            inserted,
        })
    }
}
