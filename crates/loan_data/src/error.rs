use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, normalizing or summarizing loan data.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("No accepted_*.csv(.gz) found in {}", .0.display())]
    RawFileNotFound(PathBuf),

    #[error("Processed dataset not found: {}", .0.display())]
    ProcessedNotFound(PathBuf),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("{column} parse_rate too low: {rate:.3} ({parsed}/{total} parsed). Check raw format.")]
    DateParseRate {
        column: String,
        rate: f64,
        parsed: usize,
        total: usize,
    },

    #[error("Column {name} has {actual} rows, expected {expected}")]
    ColumnLength {
        name: String,
        actual: usize,
        expected: usize,
    },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Unsupported type {data_type} for column {name}")]
    UnsupportedColumnType { name: String, data_type: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoaderError {
    /// Wraps an I/O error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
