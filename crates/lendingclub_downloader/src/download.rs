//! Streaming download of the raw dataset with checksum verification.

use core::time::Duration;
use std::path::{Path, PathBuf};

use config::Config;
use reqwest::{Client, Url};
use tokio::io::AsyncWriteExt as _;
use tracing::{debug, info, warn};

use crate::DownloadError;
use crate::checksum::sha256_file;

/// File name used when the URL path has no final segment.
pub const FALLBACK_FILE_NAME: &str = "lendingclub_download";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Bytes between debug progress lines.
const PROGRESS_LOG_BYTES: u64 = 64 * 1024 * 1024;

/// What to fetch and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub expected_sha256: Option<String>,
    pub raw_dir: PathBuf,
}

impl DownloadRequest {
    /// Builds a request from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::MissingUrl`] if no URL is configured.
    pub fn from_config(config: &Config) -> Result<Self, DownloadError> {
        let url = config
            .lendingclub_url
            .clone()
            .ok_or(DownloadError::MissingUrl)?;

        Ok(Self {
            url,
            expected_sha256: config.lendingclub_sha256.clone(),
            raw_dir: config.paths().raw_dir,
        })
    }

    /// Final location of the downloaded file.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.raw_dir.join(destination_file_name(&self.url))
    }
}

/// Result of a successful download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was already on disk (and matched the checksum, if one is set).
    AlreadyPresent(PathBuf),
    Downloaded { path: PathBuf, bytes: u64 },
}

/// Last segment of the URL path, or [`FALLBACK_FILE_NAME`].
#[must_use]
pub fn destination_file_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn verify(path: &Path, expected: &str) -> Result<Option<String>, DownloadError> {
    let actual = sha256_file(path).await?;
    Ok((actual != expected).then_some(actual))
}

/// Streams `url` into `dest`, writing to `<dest>.part` first and renaming
/// once the body is complete.
async fn fetch_to_file(url: &str, dest: &Path) -> Result<u64, DownloadError> {
    let client = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .build()?;

    let mut response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    let total = response.content_length().filter(|&len| len > 0);
    let tmp = part_path(dest);
    let mut file = tokio::fs::File::create(&tmp)
        .await
        .map_err(DownloadError::io(&tmp))?;

    let mut downloaded: u64 = 0;
    let mut next_log = PROGRESS_LOG_BYTES;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(DownloadError::io(&tmp))?;
        downloaded += chunk.len() as u64;

        if downloaded >= next_log {
            debug!(downloaded, total, "Download progress");
            next_log += PROGRESS_LOG_BYTES;
        }
    }

    file.flush().await.map_err(DownloadError::io(&tmp))?;
    drop(file);

    tokio::fs::rename(&tmp, dest)
        .await
        .map_err(DownloadError::io(dest))?;

    if let Some(total) = total {
        let pct = downloaded as f64 / total as f64 * 100.0;
        info!(
            downloaded,
            total,
            percent = %format!("{pct:.2}"),
            path = %dest.display(),
            "Downloaded"
        );
    } else {
        info!(downloaded, path = %dest.display(), "Downloaded");
    }

    Ok(downloaded)
}

/// Fetches the raw dataset unless it is already present.
///
/// An existing file is only re-hashed when a checksum is configured. A
/// failed transfer leaves no file at the destination.
///
/// # Errors
///
/// Returns an error when the existing file or the fresh download does not
/// match the configured checksum, or when the transfer fails.
pub async fn download_dataset(request: &DownloadRequest) -> Result<DownloadOutcome, DownloadError> {
    let dest = request.destination();

    if dest.exists() {
        info!(path = %dest.display(), "File already exists");

        if let Some(expected) = &request.expected_sha256 {
            if let Some(actual) = verify(&dest, expected).await? {
                return Err(DownloadError::ExistingChecksumMismatch {
                    path: dest,
                    expected: expected.clone(),
                    actual,
                });
            }
            info!("SHA256 OK (existing file)");
        }

        return Ok(DownloadOutcome::AlreadyPresent(dest));
    }

    tokio::fs::create_dir_all(&request.raw_dir)
        .await
        .map_err(DownloadError::io(&request.raw_dir))?;

    info!(url = %request.url, path = %dest.display(), "Downloading dataset");

    let bytes = match fetch_to_file(&request.url, &dest).await {
        Ok(bytes) => bytes,
        Err(err) => {
            let tmp = part_path(&dest);
            if tokio::fs::remove_file(&tmp).await.is_ok() {
                debug!(path = %tmp.display(), "Removed partial download");
            }
            return Err(err);
        }
    };

    match &request.expected_sha256 {
        Some(expected) => {
            if let Some(actual) = verify(&dest, expected).await? {
                return Err(DownloadError::ChecksumMismatch {
                    path: dest,
                    expected: expected.clone(),
                    actual,
                });
            }
            info!("SHA256 OK (downloaded file)");
        }
        None => warn!("LENDINGCLUB_SHA256 not set. Skipping checksum validation."),
    }

    Ok(DownloadOutcome::Downloaded { path: dest, bytes })
}
