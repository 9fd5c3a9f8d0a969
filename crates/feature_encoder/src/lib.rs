//! Feature encoder crate for the credit decisioning model.
//!
//! Turns the normalized loan table into a numeric feature matrix and keeps
//! the resulting column layout as an explicit [`FeatureSchema`]. The same
//! schema encodes single records at scoring time, so training and serving
//! always agree on column names and order.

mod encode;
mod error;
mod matrix;
mod sanitize;
mod schema;

pub use encode::{TrainingFrame, encode_training};
pub use error::EncodeError;
pub use matrix::FeatureMatrix;
pub use sanitize::{MISSING_CATEGORY, dummy_name, sanitize_feature_name};
pub use schema::{FeatureSchema, FeatureValue};
