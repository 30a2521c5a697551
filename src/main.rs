//! Main entry point for the coinglass-ingest CLI

use clap::Parser;
use coinglass_ingest::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("coinglass_ingest=info"));

    // Logs go to stderr so command output on stdout stays machine-readable.
    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest(ref args) => args.execute(&cli).await,
        Commands::FetchRaw(ref args) => args.execute(&cli).await,
        Commands::Endpoints(ref args) => args.execute(&cli),
        Commands::View(ref args) => args.execute(&cli),
        Commands::Export(ref args) => args.execute(&cli),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
