//! `view` command: read-only look into the database

use clap::Args;

use super::{open_existing, Cli, CliError, OutputFormat};
use crate::store::TableRows;

/// Arguments for the `view` command
#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Table to show; lists all tables when omitted
    pub table: Option<String>,

    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

/// Render rows as a pipe-delimited table
pub fn render_pipe_table(rows: &TableRows) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", rows.columns.join(" | ")));
    out.push('|');
    for _ in &rows.columns {
        out.push_str("---|");
    }
    out.push('\n');
    for row in rows.rendered() {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

impl ViewArgs {
    /// Execute the viewer. Unknown tables and query errors are returned.
    pub fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let store = open_existing(&cli.db)?;

        match (&self.table, cli.output_format) {
            (None, OutputFormat::Human) => {
                println!("Available tables:");
                for table in store.list_tables()? {
                    println!(" - {table}");
                }
            }
            (None, OutputFormat::Json) => {
                println!("{}", serde_json::json!(store.list_tables()?));
            }
            (Some(table), OutputFormat::Human) => {
                let rows = store.select_rows(table, Some(self.limit))?;
                print!("{}", render_pipe_table(&rows));
            }
            (Some(table), OutputFormat::Json) => {
                let rows = store.select_rows(table, Some(self.limit))?;
                let objects: Vec<serde_json::Map<String, serde_json::Value>> = rows
                    .rendered()
                    .map(|cells| {
                        rows.columns
                            .iter()
                            .cloned()
                            .zip(cells.into_iter().map(serde_json::Value::String))
                            .collect()
                    })
                    .collect();
                println!("{}", serde_json::Value::from(objects));
            }
        }
        Ok(())
    }
}
