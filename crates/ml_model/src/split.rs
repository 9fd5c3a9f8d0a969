//! Reproducible stratified train/validation split.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::ModelError;

/// Row indices of the two sides of a split, each in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

/// Splits rows so that each class contributes `validation_fraction` of its
/// rows to the validation side.
///
/// Each class is shuffled with one generator seeded from `seed`, in label
/// order, so the split only depends on the labels and the seed. Every class
/// keeps at least one row on each side.
///
/// # Errors
///
/// Returns [`ModelError::EmptyTrainingSet`] for no rows and
/// [`ModelError::ClassTooSmall`] when a class has fewer than two rows.
pub fn stratified_split(
    labels: &[u8],
    validation_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, ModelError> {
    if labels.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut validation = Vec::new();

    for class in [0_u8, 1] {
        let mut rows: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &y)| y == class)
            .map(|(i, _)| i)
            .collect();

        if rows.len() < 2 {
            return Err(ModelError::ClassTooSmall {
                class,
                count: rows.len(),
            });
        }

        rows.shuffle(&mut rng);
        let n_validation =
            ((rows.len() as f64 * validation_fraction).round() as usize).clamp(1, rows.len() - 1);

        validation.extend_from_slice(&rows[..n_validation]);
        train.extend_from_slice(&rows[n_validation..]);
    }

    train.sort_unstable();
    validation.sort_unstable();

    Ok(SplitIndices { train, validation })
}
