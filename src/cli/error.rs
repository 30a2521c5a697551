//! CLI error types and conversions

use crate::config::ConfigError;
use crate::downloader::IngestError;
use crate::fetcher::FetcherError;
use crate::output::OutputError;
use crate::registry::RegistryError;
use crate::store::StoreError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid run configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ingest failure (planning or a single job)
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    Fetcher(#[from] FetcherError),

    /// Store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Registry error
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Environment setup failure (metrics exporter, serialization)
    #[error("setup error: {0}")]
    Setup(String),
}
