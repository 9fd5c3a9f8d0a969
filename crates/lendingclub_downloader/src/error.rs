use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while fetching the raw dataset.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(
        "Missing LENDINGCLUB_URL.\nSet it in your .env file, e.g.\nLENDINGCLUB_URL=https://.../accepted_2007_to_2018Q4.csv.gz"
    )]
    MissingUrl,

    #[error(
        "SHA256 mismatch for existing file {}.\nExpected: {expected}\nActual:   {actual}\nDelete the file and re-run download.",
        path.display()
    )]
    ExistingChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Download failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Download failed: {url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "SHA256 mismatch after download of {}.\nExpected: {expected}\nActual:   {actual}",
        path.display()
    )]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl DownloadError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// Process exit code reported for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MissingUrl => 2,
            Self::ExistingChecksumMismatch { .. } => 3,
            Self::Request(_) | Self::HttpStatus { .. } | Self::Io { .. } => 4,
            Self::ChecksumMismatch { .. } => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(DownloadError::MissingUrl.exit_code(), 2);
        assert_eq!(
            DownloadError::ExistingChecksumMismatch {
                path: PathBuf::from("a"),
                expected: "x".into(),
                actual: "y".into(),
            }
            .exit_code(),
            3
        );
        assert_eq!(
            DownloadError::io("a")(std::io::Error::other("boom")).exit_code(),
            4
        );
        assert_eq!(
            DownloadError::ChecksumMismatch {
                path: PathBuf::from("a"),
                expected: "x".into(),
                actual: "y".into(),
            }
            .exit_code(),
            5
        );
    }
}
