//! End-to-end training: split, fit and validate.

use feature_encoder::TrainingFrame;
use tracing::info;

use crate::bundle::MODEL_TYPE;
use crate::split::stratified_split;
use crate::{GbdtClassifier, GbdtParams, ModelBundle, ModelError, ModelInfo, ValidationMetrics};

/// Configuration of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Share of each class held out for validation.
    pub validation_fraction: f64,
    /// Seed of the train/validation split.
    pub split_seed: u64,
    /// Ensemble hyperparameters.
    pub gbdt: GbdtParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            validation_fraction: 0.2,
            split_seed: 42,
            gbdt: GbdtParams::default(),
        }
    }
}

/// Output from training.
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    pub bundle: ModelBundle,
    pub train_rows: usize,
    pub val_rows: usize,
    pub metrics: ValidationMetrics,
}

impl TrainingOutput {
    /// Run metadata for a bundle saved at `model_path`.
    #[must_use]
    pub fn info(&self, model_path: &std::path::Path, random_state: u64) -> ModelInfo {
        ModelInfo {
            model_type: MODEL_TYPE.to_string(),
            train_rows: self.train_rows,
            val_rows: self.val_rows,
            n_features: self.bundle.schema.len(),
            random_state,
            model_path: model_path.display().to_string(),
        }
    }
}

/// Trains a classifier on an encoded frame and scores the held-out rows.
///
/// # Errors
///
/// Returns an error if the frame is empty or a class is too small to split.
pub fn train(frame: &TrainingFrame, config: &TrainingConfig) -> Result<TrainingOutput, ModelError> {
    let split = stratified_split(&frame.labels, config.validation_fraction, config.split_seed)?;

    let select_labels = |rows: &[usize]| -> Vec<u8> { rows.iter().map(|&i| frame.labels[i]).collect() };

    let train_features = frame.features.select_rows(&split.train);
    let train_labels = select_labels(&split.train);
    let val_features = frame.features.select_rows(&split.validation);
    let val_labels = select_labels(&split.validation);

    info!(
        train_rows = split.train.len(),
        val_rows = split.validation.len(),
        features = frame.features.n_features(),
        trees = config.gbdt.n_estimators,
        "Training gradient-boosted trees"
    );

    let model = GbdtClassifier::fit(&train_features, &train_labels, &config.gbdt)?;

    let probabilities = model.predict_proba_matrix(&val_features);
    let metrics = ValidationMetrics::compute(&val_labels, &probabilities);

    info!(
        val_auc = metrics.val_auc,
        val_brier = metrics.val_brier,
        "Validation metrics"
    );

    Ok(TrainingOutput {
        bundle: ModelBundle {
            model,
            schema: frame.schema.clone(),
        },
        train_rows: split.train.len(),
        val_rows: split.validation.len(),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use feature_encoder::{FeatureMatrix, FeatureSchema, FeatureValue};

    use super::*;

    fn frame(n: usize) -> TrainingFrame {
        let rate: Vec<f64> = (0..n).map(|i| 5.0 + (i % 25) as f64).collect();
        let grade_a: Vec<f64> = (0..n).map(|i| f64::from(u8::from(i % 25 < 12))).collect();
        let grade_b: Vec<f64> = grade_a.iter().map(|a| 1.0 - a).collect();
        let labels = (0..n).map(|i| u8::from(i % 25 >= 20)).collect();

        let features = FeatureMatrix::from_columns(
            n,
            [
                ("int_rate".to_string(), rate),
                ("grade_A".to_string(), grade_a),
                ("grade_B".to_string(), grade_b),
            ],
        )
        .expect("matrix");

        TrainingFrame {
            schema: FeatureSchema::new(
                features.names().to_vec(),
                vec!["int_rate".to_string()],
                vec!["grade".to_string()],
            ),
            features,
            labels,
        }
    }

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            gbdt: GbdtParams {
                n_estimators: 40,
                learning_rate: 0.2,
                num_leaves: 8,
                min_child_samples: 5,
                ..GbdtParams::default()
            },
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_train_reports_split_and_metrics() {
        let output = train(&frame(500), &quick_config()).expect("train");

        assert_eq!(output.train_rows + output.val_rows, 500);
        assert_eq!(output.val_rows, 100);
        assert!(output.metrics.val_auc > 0.9);
        assert!((0.0..=1.0).contains(&output.metrics.val_brier));

        let info = output.info(std::path::Path::new("models/gbdt_model.json"), 42);
        assert_eq!(info.model_type, "gbdt");
        assert_eq!(info.n_features, 3);
        assert_eq!(info.random_state, 42);
    }

    #[test]
    fn test_bundle_roundtrip_and_score() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("models").join("gbdt_model.json");
        let output = train(&frame(300), &quick_config()).expect("train");

        output.bundle.save(&path).expect("save");
        let loaded = ModelBundle::load(&path).expect("load");
        assert_eq!(loaded, output.bundle);

        let high: BTreeMap<String, FeatureValue> =
            [("int_rate".to_string(), FeatureValue::Number(27.0))].into_iter().collect();
        let low: BTreeMap<String, FeatureValue> =
            [("int_rate".to_string(), FeatureValue::Number(6.0))].into_iter().collect();
        assert!(loaded.score(&high) > loaded.score(&low));
    }

    #[test]
    fn test_missing_bundle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.json");
        assert!(matches!(
            ModelBundle::load(&path),
            Err(ModelError::BundleNotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_single_class_is_rejected() {
        let mut frame = frame(50);
        frame.labels = vec![0; 50];
        assert!(matches!(
            train(&frame, &quick_config()),
            Err(ModelError::ClassTooSmall { class: 1, count: 0 })
        ));
    }
}
