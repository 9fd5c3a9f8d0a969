//! Gradient-boosted decision trees for the credit decisioning model.
//!
//! A histogram-based GBDT binary classifier with leaf-wise growth, the
//! stratified split and validation metrics used during training, and the
//! [`ModelBundle`] that pairs a fitted model with its feature schema for
//! serving.

mod binning;
mod booster;
mod bundle;
mod error;
mod grower;
mod metrics;
mod split;
mod train;
mod tree;

pub use binning::{BinMapper, BinnedMatrix};
pub use booster::{GbdtClassifier, GbdtParams};
pub use bundle::{MODEL_TYPE, ModelBundle, ModelInfo, write_json};
pub use error::ModelError;
pub use metrics::{ValidationMetrics, brier_score, roc_auc};
pub use split::{SplitIndices, stratified_split};
pub use train::{TrainingConfig, TrainingOutput, train};
pub use tree::{Node, Tree};
