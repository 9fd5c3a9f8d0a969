//! Credit decisioning baseline CLI.
//!
//! Downloads the LendingClub export, normalizes it, reports data quality,
//! trains the default-risk classifier and serves decisions over HTTP.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use credit_decisioning::commands;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Credit decisioning baseline
#[derive(Parser)]
#[command(name = "credit-decisioning")]
#[command(about = "Default-risk model training and scoring for LendingClub loans")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the raw dataset from LENDINGCLUB_URL
    Download,

    /// Normalize the raw export into the processed Parquet table
    Ingest,

    /// Write the data quality report for the processed table
    Quality,

    /// Train the classifier and write the model bundle and metrics
    Train,

    /// Run ingest, quality and train in order
    TrainAll,

    /// Serve the scoring API on SCORING_ADDR
    Serve,
}

async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    let paths = config.paths();

    match command {
        Commands::Download => commands::download::run(config).await?,
        Commands::Ingest => {
            let summary = commands::ingest::run(&paths)?;
            info!(
                raw_rows = summary.raw_rows,
                kept_rows = summary.kept_rows,
                "Ingestion complete"
            );
        }
        Commands::Quality => {
            let report = commands::quality::run(&paths)?;
            info!(
                rows = report.n_rows,
                cols = report.n_cols,
                duplicates = report.n_duplicates,
                "Quality report complete"
            );
        }
        Commands::Train => {
            commands::train::run(&paths)?;
        }
        Commands::TrainAll => commands::train_all::run(&paths)?,
        Commands::Serve => commands::serve::run(config).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match Config::from_env() {
        Ok(config) => dispatch(cli.command, &config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(commands::exit_code(&err))
        }
    }
}
