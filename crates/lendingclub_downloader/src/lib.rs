//! LendingClub dataset downloader.
//!
//! Fetches the raw accepted-loans export into the raw data directory,
//! verifying its SHA-256 when one is configured.

mod checksum;
mod download;
mod error;

pub use checksum::sha256_file;
pub use download::{
    DownloadOutcome, DownloadRequest, FALLBACK_FILE_NAME, destination_file_name, download_dataset,
};
pub use error::DownloadError;

/// Loads configuration and runs one download.
///
/// # Errors
///
/// Returns an error if the URL is missing, the transfer fails or a checksum
/// does not match.
pub async fn run(config: &config::Config) -> Result<DownloadOutcome, DownloadError> {
    let request = DownloadRequest::from_config(config)?;
    download_dataset(&request).await
}
