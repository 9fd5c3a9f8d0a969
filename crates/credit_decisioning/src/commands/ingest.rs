//! Ingest command - normalizes the raw export into the processed table.

use anyhow::{Context, Result};
use config::PipelinePaths;
use loan_data::{LoadSummary, load_and_normalize, write_parquet};
use tracing::info;

/// Runs the ingest command.
///
/// # Errors
///
/// Returns an error if no raw file is found, a required column is missing,
/// too few issue dates parse, or the table cannot be written.
pub fn run(paths: &PipelinePaths) -> Result<LoadSummary> {
    info!(raw_dir = %paths.raw_dir.display(), "Starting ingestion");

    let dataset = load_and_normalize(&paths.raw_dir)
        .with_context(|| format!("Failed to normalize raw data in {}", paths.raw_dir.display()))?;

    write_parquet(&dataset.table, &paths.processed_path).with_context(|| {
        format!(
            "Failed to write normalized table to {}",
            paths.processed_path.display()
        )
    })?;

    info!(
        source = %dataset.source.display(),
        path = %paths.processed_path.display(),
        rows = dataset.table.n_rows(),
        cols = dataset.table.n_cols(),
        "Saved normalized table"
    );

    Ok(dataset.summary)
}
