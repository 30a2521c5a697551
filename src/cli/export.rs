//! `export` command

use clap::Args;
use std::path::PathBuf;

use super::{open_existing, Cli, CliError, OutputFormat};
use crate::output::csv::export_table;

/// Arguments for the `export` command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Table to export
    pub table: String,

    /// Output CSV file (default: <table>.csv)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Export at most this many rows
    #[arg(long)]
    pub limit: Option<usize>,
}

impl ExportArgs {
    /// Destination file
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.csv", self.table)))
    }

    /// Write the table to CSV
    pub fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let store = open_existing(&cli.db)?;
        let path = self.output_path();
        let rows = export_table(&store, &self.table, &path, self.limit)?;

        match cli.output_format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({
                    "table": self.table,
                    "path": path.display().to_string(),
                    "rows": rows,
                })
            ),
            OutputFormat::Human => {
                println!("Saved {} with {} records", path.display(), rows)
            }
        }
        Ok(())
    }
}
