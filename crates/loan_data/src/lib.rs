//! LendingClub data loading for the credit decisioning pipeline.
//!
//! Reads the raw accepted-loans export (CSV or CSV.GZ), derives the binary
//! target from `loan_status`, cleans the core feature columns and stores the
//! result as a Parquet table that every later stage reads.

mod error;
pub mod normalize;
pub mod quality;
pub mod raw;
mod table;

pub use error::LoaderError;
pub use normalize::{LoadSummary, NormalizedDataset, load_and_normalize, normalize_reader};
pub use quality::{QualityReport, build_report, write_report};
pub use raw::find_accepted_file;
pub use table::{Column, Table, read_parquet, write_parquet};
