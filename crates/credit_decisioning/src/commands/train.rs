//! Train command - fits the classifier and writes the model bundle.

use anyhow::{Context, Result};
use config::PipelinePaths;
use feature_encoder::encode_training;
use loan_data::read_parquet;
use ml_model::{TrainingConfig, ValidationMetrics, train, write_json};
use tracing::info;

/// Runs the train command with the given configuration.
///
/// Writes the model bundle, its run metadata and the validation metrics.
///
/// # Errors
///
/// Returns an error if the normalized table is missing, the target is
/// missing or invalid, a class is too small to split, or an artifact cannot
/// be written.
pub fn run_with(paths: &PipelinePaths, config: &TrainingConfig) -> Result<ValidationMetrics> {
    let table = read_parquet(&paths.processed_path).with_context(|| {
        format!(
            "Failed to read normalized table {}. Run ingest first",
            paths.processed_path.display()
        )
    })?;

    let frame = encode_training(&table).context("Failed to encode features")?;
    let output = train(&frame, config).context("Training failed")?;

    output.bundle.save(&paths.model_path)?;
    write_json(
        &output.info(&paths.model_path, config.gbdt.seed),
        &paths.model_info_path,
    )?;
    write_json(&output.metrics, &paths.metrics_path)?;

    info!(
        model = %paths.model_path.display(),
        metrics = %paths.metrics_path.display(),
        val_auc = output.metrics.val_auc,
        val_brier = output.metrics.val_brier,
        "Training complete"
    );

    Ok(output.metrics)
}

/// Runs the train command with the default hyperparameters.
///
/// # Errors
///
/// See [`run_with`].
pub fn run(paths: &PipelinePaths) -> Result<ValidationMetrics> {
    run_with(paths, &TrainingConfig::default())
}
