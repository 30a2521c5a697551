//! `endpoints` command

use clap::Args;

use super::{Cli, CliError, OutputFormat};
use crate::registry::{EndpointEntry, EndpointRegistry};

/// Arguments for the `endpoints` command
#[derive(Args, Debug)]
pub struct EndpointsArgs {
    /// Optional name pattern (supports `*` wildcards)
    pub pattern: Option<String>,

    /// Only show one category (e.g. liquidation, etf)
    #[arg(long)]
    pub category: Option<String>,

    /// Only show endpoints usable on the Hobbyist plan
    #[arg(long, default_value_t = false)]
    pub hobbyist: bool,
}

impl EndpointsArgs {
    /// Catalog entries selected by the filters
    pub fn select<'a>(&self, registry: &'a EndpointRegistry) -> Result<Vec<&'a EndpointEntry>, CliError> {
        let entries = match &self.pattern {
            Some(pattern) => registry.resolve_pattern(pattern)?,
            None => registry.entries(),
        };

        Ok(entries
            .into_iter()
            .filter(|e| self.category.as_deref().map_or(true, |c| e.category() == c))
            .filter(|e| !self.hobbyist || e.hobbyist())
            .collect())
    }

    /// Print the selected entries
    pub fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let registry = EndpointRegistry::load().map_err(|e| CliError::Setup(e.to_string()))?;
        let entries = self.select(registry)?;

        match cli.output_format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&entries)
                    .map_err(|e| CliError::Setup(format!("Failed to serialize endpoints: {e}")))?;
                println!("{json}");
            }
            OutputFormat::Human => {
                println!("Found {} endpoints:\n", entries.len());
                for entry in entries {
                    println!(
                        "{} | {} | {}{}{}",
                        entry.name(),
                        entry.path(),
                        entry.category(),
                        if entry.requires_symbol() { " | symbol" } else { "" },
                        if entry.hobbyist() { " | hobbyist" } else { "" },
                    );
                }
            }
        }
        Ok(())
    }
}
