//! Train-all command - runs ingest, quality and train in order.

use anyhow::Result;
use config::PipelinePaths;
use loan_structs::PipelineStep;
use ml_model::TrainingConfig;
use strum::IntoEnumIterator as _;
use tracing::{error, info};

use super::{exit_code, ingest, quality, train};

fn run_step(step: PipelineStep, paths: &PipelinePaths, config: &TrainingConfig) -> Result<()> {
    match step {
        PipelineStep::Ingest => ingest::run(paths).map(drop),
        PipelineStep::Quality => quality::run(paths).map(drop),
        PipelineStep::Train => train::run_with(paths, config).map(drop),
    }
}

/// Runs every pipeline step, stopping at the first failure.
///
/// # Errors
///
/// Returns the failing step's error unchanged, so the process exits with
/// that step's exit code.
pub fn run_with(paths: &PipelinePaths, config: &TrainingConfig) -> Result<()> {
    for step in PipelineStep::iter() {
        info!(%step, "Running step");

        if let Err(err) = run_step(step, paths, config) {
            error!(%step, exit_code = exit_code(&err), "Step failed");
            return Err(err);
        }
    }

    info!("All steps completed");
    Ok(())
}

/// Runs every pipeline step with the default training configuration.
///
/// # Errors
///
/// See [`run_with`].
pub fn run(paths: &PipelinePaths) -> Result<()> {
    run_with(paths, &TrainingConfig::default())
}
