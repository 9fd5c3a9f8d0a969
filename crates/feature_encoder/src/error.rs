use thiserror::Error;

/// Errors raised while encoding features.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid label at row {row}: {value}")]
    InvalidLabel { row: usize, value: String },

    #[error("Column {name} has {actual} rows, expected {expected}")]
    ColumnLength {
        name: String,
        actual: usize,
        expected: usize,
    },
}
