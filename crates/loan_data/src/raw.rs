//! Discovery and decoding of the raw accepted-loans export.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::LoaderError;

const ACCEPTED_PREFIX: &str = "accepted_";

/// Picks the accepted loans file in `raw_dir`.
///
/// A compressed `accepted_*.csv.gz` is preferred over a plain
/// `accepted_*.csv`; within each kind the lexicographically first name wins.
///
/// # Errors
///
/// Returns [`LoaderError::RawFileNotFound`] if the directory is missing or
/// holds no matching file.
pub fn find_accepted_file(raw_dir: &Path) -> Result<PathBuf, LoaderError> {
    let Ok(entries) = std::fs::read_dir(raw_dir) else {
        return Err(LoaderError::RawFileNotFound(raw_dir.to_path_buf()));
    };

    let mut gz = Vec::new();
    let mut csv = Vec::new();

    for entry in entries {
        let path = entry.map_err(LoaderError::io(raw_dir))?.path();
        if !path.is_file() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if !name.starts_with(ACCEPTED_PREFIX) {
            continue;
        }

        if name.ends_with(".csv.gz") {
            gz.push(path);
        } else if name.ends_with(".csv") {
            csv.push(path);
        }
    }

    gz.sort();
    csv.sort();

    gz.into_iter()
        .chain(csv)
        .next()
        .ok_or_else(|| LoaderError::RawFileNotFound(raw_dir.to_path_buf()))
}

/// Opens a raw file, transparently decompressing `.gz` input.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn open_raw(path: &Path) -> Result<Box<dyn Read>, LoaderError> {
    let file = File::open(path).map_err(LoaderError::io(path))?;
    let reader = BufReader::new(file);

    let is_gzip = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));

    if is_gzip {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}
