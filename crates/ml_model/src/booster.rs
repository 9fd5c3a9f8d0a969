//! Gradient-boosted tree classifier with logistic loss.

use feature_encoder::FeatureMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ModelError;
use crate::binning::BinnedMatrix;
use crate::grower::{GrowerParams, TreeGrower};
use crate::tree::Tree;

/// Probability clamp used when deriving the initial score.
const PROBABILITY_EPSILON: f64 = 1e-15;

/// Trees between progress log lines.
const LOG_EVERY: usize = 100;

/// Hyperparameters of the boosted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtParams {
    /// Number of boosting rounds.
    pub n_estimators: usize,
    /// Shrinkage applied to every leaf value.
    pub learning_rate: f64,
    /// Maximum leaves per tree.
    pub num_leaves: usize,
    /// Fraction of rows drawn (without replacement) for each tree.
    pub subsample: f64,
    /// Fraction of features drawn for each tree.
    pub colsample_bytree: f64,
    /// Minimum rows in a leaf.
    pub min_child_samples: usize,
    /// Minimum hessian sum in a leaf.
    pub min_child_weight: f64,
    /// Maximum value bins per feature.
    pub max_bins: usize,
    /// L2 penalty on leaf values.
    pub lambda_l2: f64,
    /// Minimum gain required to split.
    pub min_split_gain: f64,
    /// Seed for row and feature sampling.
    pub seed: u64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_estimators: 600,
            learning_rate: 0.05,
            num_leaves: 31,
            subsample: 0.9,
            colsample_bytree: 0.9,
            min_child_samples: 20,
            min_child_weight: 1e-3,
            max_bins: 255,
            lambda_l2: 0.0,
            min_split_gain: 0.0,
            seed: 42,
        }
    }
}

impl GbdtParams {
    const fn grower_params(&self) -> GrowerParams {
        GrowerParams {
            num_leaves: self.num_leaves,
            min_samples_leaf: self.min_child_samples,
            min_hessian_leaf: self.min_child_weight,
            lambda_l2: self.lambda_l2,
            min_split_gain: self.min_split_gain,
            learning_rate: self.learning_rate,
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Draws `fraction` of `0..n` without replacement, in ascending order.
fn sample_sorted(rng: &mut StdRng, n: usize, fraction: f64) -> Vec<usize> {
    if fraction >= 1.0 || n == 0 {
        return (0..n).collect();
    }
    let amount = ((n as f64 * fraction).round() as usize).clamp(1, n);
    let mut picked = index::sample(rng, n, amount).into_vec();
    picked.sort_unstable();
    picked
}

/// Binary classifier: a sum of regression trees over a constant initial
/// log-odds score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtClassifier {
    n_features: usize,
    init_score: f64,
    trees: Vec<Tree>,
}

impl GbdtClassifier {
    /// Fits the ensemble on `features` and 0/1 `labels`.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is empty or the label count differs
    /// from the row count.
    pub fn fit(
        features: &FeatureMatrix,
        labels: &[u8],
        params: &GbdtParams,
    ) -> Result<Self, ModelError> {
        let n_rows = features.n_rows();
        if n_rows == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if labels.len() != n_rows {
            return Err(ModelError::LabelCount {
                labels: labels.len(),
                rows: n_rows,
            });
        }

        let targets: Vec<f64> = labels.iter().map(|&y| f64::from(y)).collect();
        let positive_rate = (targets.iter().sum::<f64>() / n_rows as f64)
            .clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
        let init_score = (positive_rate / (1.0 - positive_rate)).ln();

        let binned = BinnedMatrix::build(features, params.max_bins);
        debug!(
            rows = n_rows,
            features = features.n_features(),
            "Binned feature matrix"
        );

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut raw = vec![init_score; n_rows];
        let mut gradients = vec![0.0; n_rows];
        let mut hessians = vec![0.0; n_rows];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for round in 0..params.n_estimators {
            gradients
                .par_iter_mut()
                .zip(hessians.par_iter_mut())
                .zip(raw.par_iter().zip(&targets))
                .for_each(|((g, h), (&score, &y))| {
                    let p = sigmoid(score);
                    *g = p - y;
                    *h = p * (1.0 - p);
                });

            let rows: Vec<u32> = sample_sorted(&mut rng, n_rows, params.subsample)
                .into_iter()
                .map(|row| row as u32)
                .collect();
            let sampled_features =
                sample_sorted(&mut rng, features.n_features(), params.colsample_bytree);

            let grower = TreeGrower::new(
                &binned,
                &gradients,
                &hessians,
                &sampled_features,
                params.grower_params(),
            );
            let tree = grower.grow(rows);

            raw.par_iter_mut().enumerate().for_each(|(row, score)| {
                *score += tree.predict_with(|feature| features.column(feature)[row]);
            });
            trees.push(tree);

            if (round + 1) % LOG_EVERY == 0 {
                info!(trees = round + 1, total = params.n_estimators, "Boosting");
            }
        }

        Ok(Self {
            n_features: features.n_features(),
            init_score,
            trees,
        })
    }

    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw log-odds score of one dense row.
    #[must_use]
    pub fn predict_raw(&self, row: &[f64]) -> f64 {
        self.init_score + self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>()
    }

    /// Positive-class probability of one dense row.
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        sigmoid(self.predict_raw(row))
    }

    /// Positive-class probabilities of every row of `features`.
    #[must_use]
    pub fn predict_proba_matrix(&self, features: &FeatureMatrix) -> Vec<f64> {
        (0..features.n_rows())
            .into_par_iter()
            .map_init(Vec::new, |row_buf, row| {
                features.row_into(row, row_buf);
                self.predict_proba(row_buf)
            })
            .collect()
    }
}
