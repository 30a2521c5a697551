//! CLI command implementations

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_DB_PATH;
use crate::store::Store;

pub mod endpoints;
pub mod error;
pub mod export;
pub mod fetch_raw;
pub mod ingest;
pub mod view;

pub use endpoints::EndpointsArgs;
pub use error::CliError;
pub use export::ExportArgs;
pub use fetch_raw::FetchRawArgs;
pub use ingest::IngestArgs;
pub use view::ViewArgs;

/// Coinglass ingest CLI
#[derive(Parser, Debug)]
#[command(name = "coinglass-ingest")]
#[command(about = "Pull Coinglass derivatives metrics into a local SQLite database", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database file
    #[arg(long, global = true, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Output format (json or human)
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ingest jobs: typed datasets per symbol, then raw catalog endpoints
    Ingest(IngestArgs),

    /// Fetch one catalog endpoint and append its records to the raw log
    FetchRaw(FetchRawArgs),

    /// List the endpoint catalog
    Endpoints(EndpointsArgs),

    /// Show stored tables or the first rows of one table
    View(ViewArgs),

    /// Export a stored table to CSV
    Export(ExportArgs),
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Open an existing database for reading
fn open_existing(path: &Path) -> Result<Store, CliError> {
    if !path.exists() {
        return Err(CliError::InvalidArgument(format!(
            "database not found: {}",
            path.display()
        )));
    }
    Ok(Store::open(path)?)
}
