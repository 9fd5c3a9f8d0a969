//! Credit decisioning baseline.
//!
//! Pipeline stages (download, ingest, quality report, training), the
//! `train-all` orchestrator and the HTTP scoring service, all driven by the
//! `credit-decisioning` binary.

pub mod commands;
pub mod server;
