//! Persisted model bundle: the fitted ensemble plus its feature schema.

use std::collections::BTreeMap;
use std::path::Path;

use feature_encoder::{FeatureSchema, FeatureValue};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{GbdtClassifier, ModelError};

/// Tag written to the model info document.
pub const MODEL_TYPE: &str = "gbdt";

/// Everything needed to score a raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model: GbdtClassifier,
    pub schema: FeatureSchema,
}

/// Run metadata stored next to the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub train_rows: usize,
    pub val_rows: usize,
    pub n_features: usize,
    pub random_state: u64,
    pub model_path: String,
}

/// Serializes `value` as pretty JSON at `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ModelError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ModelError::io(parent))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(ModelError::io(path))
}

impl ModelBundle {
    /// Writes the bundle as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        write_json(self, path)?;
        info!(
            path = %path.display(),
            features = self.schema.len(),
            trees = self.model.n_trees(),
            "Saved model bundle"
        );
        Ok(())
    }

    /// Reads a bundle written by [`ModelBundle::save`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::BundleNotFound`] if no file exists at `path`,
    /// and an error if the file is malformed or its parts disagree.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::BundleNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(ModelError::io(path))?;
        let bundle: Self = serde_json::from_slice(&bytes)?;

        if bundle.model.n_features() != bundle.schema.len() {
            return Err(ModelError::FeatureCountMismatch {
                model: bundle.model.n_features(),
                schema: bundle.schema.len(),
            });
        }

        Ok(bundle)
    }

    /// Probability of the positive (bad loan) class for one raw record.
    #[must_use]
    pub fn score(&self, record: &BTreeMap<String, FeatureValue>) -> f64 {
        self.model.predict_proba(&self.schema.transform(record))
    }
}
