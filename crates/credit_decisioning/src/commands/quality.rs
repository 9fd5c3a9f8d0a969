//! Quality command - summarizes the normalized table.

use anyhow::{Context, Result};
use config::PipelinePaths;
use loan_data::{QualityReport, build_report, read_parquet, write_report};

/// Runs the quality command.
///
/// # Errors
///
/// Returns an error if the normalized table is missing or unreadable, or the
/// report cannot be written.
pub fn run(paths: &PipelinePaths) -> Result<QualityReport> {
    let table = read_parquet(&paths.processed_path).with_context(|| {
        format!(
            "Failed to read normalized table {}. Run ingest first",
            paths.processed_path.display()
        )
    })?;

    let report = build_report(&table, &paths.processed_path)?;
    write_report(&report, &paths.quality_report_path)?;

    Ok(report)
}
