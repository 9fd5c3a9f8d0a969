//! Environment-driven configuration shared by every pipeline stage.

mod config;

pub use config::{Config, PipelinePaths};
