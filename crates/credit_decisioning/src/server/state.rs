use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use loan_structs::DecisionPolicy;
use ml_model::{ModelBundle, ModelError};
use tracing::{info, warn};

/// Shared, read-only service state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub model: Option<Arc<ModelBundle>>,
    pub model_path: PathBuf,
    pub policy: DecisionPolicy,
}

impl AppState {
    /// State around an already loaded bundle.
    #[must_use]
    pub fn with_model(model: ModelBundle, model_path: &Path) -> Self {
        Self {
            model: Some(Arc::new(model)),
            model_path: model_path.to_path_buf(),
            policy: DecisionPolicy::default(),
        }
    }

    /// State without a model; scoring reports how to train one.
    #[must_use]
    pub fn without_model(model_path: &Path) -> Self {
        Self {
            model: None,
            model_path: model_path.to_path_buf(),
            policy: DecisionPolicy::default(),
        }
    }

    /// Loads the bundle at `model_path` once.
    ///
    /// A missing bundle is not an error: the service still starts.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundle exists but cannot be read.
    pub fn load(model_path: &Path) -> Result<Self> {
        match ModelBundle::load(model_path) {
            Ok(bundle) => {
                info!(
                    path = %model_path.display(),
                    features = bundle.schema.len(),
                    "Loaded model bundle"
                );
                Ok(Self::with_model(bundle, model_path))
            }
            Err(ModelError::BundleNotFound(_)) => {
                warn!(path = %model_path.display(), "No model bundle; /score will fail until one is trained");
                Ok(Self::without_model(model_path))
            }
            Err(err) => Err(err)
                .with_context(|| format!("Failed to load model bundle {}", model_path.display())),
        }
    }
}
