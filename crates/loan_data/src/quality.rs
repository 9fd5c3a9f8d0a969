//! Data quality report over the normalized table.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use loan_structs::TARGET_COLUMN;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{LoaderError, Table};

/// Bucket name used for missing target values.
pub const NULL_BUCKET: &str = "null";

/// Decimal places kept in null rates.
const NULL_RATE_DECIMALS: i32 = 6;

/// Point-in-time snapshot of the normalized dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub dataset_path: String,
    pub n_rows: usize,
    pub n_cols: usize,
    pub n_duplicates: usize,
    pub null_rate_by_col: BTreeMap<String, f64>,
    pub target_distribution: BTreeMap<String, usize>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Counts rows that fully equal an earlier row.
fn count_duplicates(table: &Table) -> usize {
    let mut seen: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut duplicates = 0;

    for row in 0..table.n_rows() {
        let bucket = seen.entry(table.row_hash(row)).or_default();
        if bucket.iter().any(|&earlier| table.rows_equal(earlier, row)) {
            duplicates += 1;
        } else {
            bucket.push(row);
        }
    }

    duplicates
}

/// Computes the quality report for a normalized table.
///
/// # Errors
///
/// Returns [`LoaderError::MissingColumn`] if the table has no target column.
pub fn build_report(table: &Table, dataset_path: &Path) -> Result<QualityReport, LoaderError> {
    let target = table
        .column(TARGET_COLUMN)
        .ok_or_else(|| LoaderError::MissingColumn(TARGET_COLUMN.to_string()))?;

    let n_rows = table.n_rows();

    let null_rate_by_col = table
        .iter()
        .map(|(name, column)| {
            let rate = if n_rows == 0 {
                0.0
            } else {
                column.null_count() as f64 / n_rows as f64
            };
            (name.to_string(), round_to(rate, NULL_RATE_DECIMALS))
        })
        .collect();

    let mut target_distribution = BTreeMap::new();
    for row in 0..n_rows {
        let key = target
            .display_value(row)
            .unwrap_or_else(|| NULL_BUCKET.to_string());
        *target_distribution.entry(key).or_insert(0) += 1;
    }

    Ok(QualityReport {
        dataset_path: dataset_path.display().to_string(),
        n_rows,
        n_cols: table.n_cols(),
        n_duplicates: count_duplicates(table),
        null_rate_by_col,
        target_distribution,
    })
}

/// Writes the report as pretty JSON, replacing any previous report.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_report(report: &QualityReport, path: &Path) -> Result<(), LoaderError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(LoaderError::io(parent))?;
    }

    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(LoaderError::io(path))?;

    info!(
        path = %path.display(),
        rows = report.n_rows,
        duplicates = report.n_duplicates,
        "Saved quality report"
    );

    Ok(())
}
