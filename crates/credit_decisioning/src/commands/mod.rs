//! CLI command implementations.

pub mod download;
pub mod ingest;
pub mod quality;
pub mod serve;
pub mod train;
pub mod train_all;

use lendingclub_downloader::DownloadError;

/// Exit code for failures without a more specific one.
pub const GENERIC_FAILURE: u8 = 1;

/// Process exit code for a failed command.
///
/// Download failures keep their dedicated codes; everything else is
/// [`GENERIC_FAILURE`].
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<DownloadError>())
        .map_or(GENERIC_FAILURE, DownloadError::exit_code)
}

#[cfg(test)]
mod tests {
    use anyhow::Context as _;

    use super::*;

    #[test]
    fn test_exit_code_of_download_error() {
        let err = anyhow::Error::from(DownloadError::MissingUrl);
        assert_eq!(exit_code(&err), 2);

        let wrapped = Err::<(), _>(DownloadError::MissingUrl)
            .context("download step")
            .expect_err("error");
        assert_eq!(exit_code(&wrapped), 2);
    }

    #[test]
    fn test_exit_code_defaults_to_one() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code(&err), GENERIC_FAILURE);
    }
}
