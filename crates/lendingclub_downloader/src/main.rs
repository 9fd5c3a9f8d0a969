//! LendingClub raw dataset downloader.
//!
//! Reads `LENDINGCLUB_URL`, `LENDINGCLUB_SHA256` and `DATA_DIR` from the
//! environment (or `.env`) and fetches the file into the raw data directory.

use std::process::ExitCode;

use clap::Parser;
use config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// LendingClub dataset downloader
#[derive(Parser)]
#[command(name = "lendingclub-download")]
#[command(about = "Download the raw LendingClub accepted-loans export")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    match lendingclub_downloader::run(&config).await {
        Ok(outcome) => {
            info!(?outcome, "Download step complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
