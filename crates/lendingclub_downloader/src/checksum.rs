use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt as _;

use crate::DownloadError;

const READ_CHUNK_BYTES: usize = 1024 * 1024;

/// Lower-case hex SHA-256 of a file, read in 1 MiB chunks.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn sha256_file(path: &Path) -> Result<String, DownloadError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(DownloadError::io(path))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0_u8; READ_CHUNK_BYTES];

    loop {
        let read = file
            .read(&mut buffer)
            .await
            .map_err(DownloadError::io(path))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
