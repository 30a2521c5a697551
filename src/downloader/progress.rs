//! Terminal progress over the jobs of a run

use indicatif::{ProgressBar, ProgressStyle};

const JOB_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs {msg}";

/// Progress bar sized to a run's job count
pub fn job_progress_bar(total_jobs: usize) -> ProgressBar {
    let pb = ProgressBar::new(total_jobs as u64);
    let style = ProgressStyle::default_bar()
        .template(JOB_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
