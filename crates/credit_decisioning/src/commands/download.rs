//! Download command - fetches the raw dataset.

use anyhow::Result;
use config::Config;
use lendingclub_downloader::DownloadOutcome;
use tracing::info;

/// Runs the download command.
///
/// # Errors
///
/// Returns a [`lendingclub_downloader::DownloadError`] if the URL is missing,
/// the transfer fails or a checksum does not match.
pub async fn run(config: &Config) -> Result<()> {
    match lendingclub_downloader::run(config).await? {
        DownloadOutcome::AlreadyPresent(path) => {
            info!(path = %path.display(), "Raw dataset already present");
        }
        DownloadOutcome::Downloaded { path, bytes } => {
            info!(path = %path.display(), bytes, "Raw dataset downloaded");
        }
    }
    Ok(())
}
