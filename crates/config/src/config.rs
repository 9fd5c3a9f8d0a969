use core::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default data directory when `DATA_DIR` is not set.
const DEFAULT_DATA_DIR: &str = "data";

/// Default artifacts directory when `ARTIFACTS_DIR` is not set.
const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Default bind address of the scoring service.
const DEFAULT_SCORING_ADDR: &str = "127.0.0.1:8000";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of raw and processed datasets.
    pub data_dir: PathBuf,

    /// Root of models and reports.
    pub artifacts_dir: PathBuf,

    /// Source URL of the raw LendingClub dataset.
    pub lendingclub_url: Option<String>,

    /// Expected SHA-256 of the downloaded file, lower-cased.
    pub lendingclub_sha256: Option<String>,

    /// Address the scoring service listens on.
    pub scoring_addr: SocketAddr,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// Optional environment variables:
    /// - `DATA_DIR`: raw and processed data root (default: `data`)
    /// - `ARTIFACTS_DIR`: models and reports root (default: `artifacts`)
    /// - `LENDINGCLUB_URL`: dataset download URL
    /// - `LENDINGCLUB_SHA256`: expected checksum of the download
    /// - `SCORING_ADDR`: scoring service bind address (default: `127.0.0.1:8000`)
    ///
    /// # Errors
    ///
    /// Returns an error if `SCORING_ADDR` is not a valid socket address.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `SCORING_ADDR` is not a valid socket address.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = get("DATA_DIR").map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let artifacts_dir =
            get("ARTIFACTS_DIR").map_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR), PathBuf::from);

        let scoring_addr_raw = get("SCORING_ADDR").unwrap_or_else(|| DEFAULT_SCORING_ADDR.to_string());
        let scoring_addr = scoring_addr_raw
            .parse()
            .with_context(|| format!("SCORING_ADDR is not a valid socket address: {scoring_addr_raw}"))?;

        Ok(Self {
            data_dir,
            artifacts_dir,
            lendingclub_url: get("LENDINGCLUB_URL"),
            lendingclub_sha256: get("LENDINGCLUB_SHA256").map(|sha| sha.to_lowercase()),
            scoring_addr,
        })
    }

    /// Returns the artifact locations derived from this configuration.
    #[must_use]
    pub fn paths(&self) -> PipelinePaths {
        PipelinePaths::new(&self.data_dir, &self.artifacts_dir)
    }
}

/// File locations shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    /// Directory holding `accepted_*.csv(.gz)` files.
    pub raw_dir: PathBuf,
    /// Normalized Parquet table.
    pub processed_path: PathBuf,
    /// Serialized model bundle.
    pub model_path: PathBuf,
    /// Run metadata for the last training.
    pub model_info_path: PathBuf,
    /// Validation metrics for the last training.
    pub metrics_path: PathBuf,
    /// Data quality report.
    pub quality_report_path: PathBuf,
}

impl PipelinePaths {
    /// Lays out the standard project paths under the given roots.
    #[must_use]
    pub fn new(data_dir: &Path, artifacts_dir: &Path) -> Self {
        let models = artifacts_dir.join("models");
        let reports = artifacts_dir.join("reports");

        Self {
            raw_dir: data_dir.join("raw").join("lending-club"),
            processed_path: data_dir.join("processed").join("train.parquet"),
            model_path: models.join("gbdt_model.json"),
            model_info_path: models.join("gbdt_model_info.json"),
            metrics_path: reports.join("metrics.json"),
            quality_report_path: reports.join("data_quality.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).expect("defaults should parse");

        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.artifacts_dir, PathBuf::from("artifacts"));
        assert!(config.lendingclub_url.is_none());
        assert!(config.lendingclub_sha256.is_none());
        assert_eq!(config.scoring_addr.port(), 8000);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup_from(&[
            ("LENDINGCLUB_URL", "   "),
            ("DATA_DIR", ""),
        ]))
        .expect("config should parse");

        assert!(config.lendingclub_url.is_none());
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_sha_is_lowercased() {
        let config = Config::from_lookup(lookup_from(&[("LENDINGCLUB_SHA256", " ABCDEF ")]))
            .expect("config should parse");

        assert_eq!(config.lendingclub_sha256.as_deref(), Some("abcdef"));
    }

    #[test]
    fn test_invalid_scoring_addr() {
        let result = Config::from_lookup(lookup_from(&[("SCORING_ADDR", "not-an-addr")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_paths_layout() {
        let paths = PipelinePaths::new(Path::new("/d"), Path::new("/a"));

        assert_eq!(paths.raw_dir, PathBuf::from("/d/raw/lending-club"));
        assert_eq!(paths.processed_path, PathBuf::from("/d/processed/train.parquet"));
        assert_eq!(paths.model_path, PathBuf::from("/a/models/gbdt_model.json"));
        assert_eq!(paths.metrics_path, PathBuf::from("/a/reports/metrics.json"));
        assert_eq!(
            paths.quality_report_path,
            PathBuf::from("/a/reports/data_quality.json")
        );
    }
}
