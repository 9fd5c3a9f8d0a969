use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while training, saving, loading or applying a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Class {class} has {count} rows; at least 2 are needed to stratify")]
    ClassTooSmall { class: u8, count: usize },

    #[error("Got {labels} labels for {rows} rows")]
    LabelCount { labels: usize, rows: usize },

    #[error("Model has {model} features but the schema lists {schema}")]
    FeatureCountMismatch { model: usize, schema: usize },

    #[error("Model not found at {}", .0.display())]
    BundleNotFound(PathBuf),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
