//! Validation metrics for binary probability forecasts.

use serde::{Deserialize, Serialize};

/// Metrics written after training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub val_auc: f64,
    pub val_brier: f64,
}

impl ValidationMetrics {
    #[must_use]
    pub fn compute(labels: &[u8], probabilities: &[f64]) -> Self {
        Self {
            val_auc: roc_auc(labels, probabilities).unwrap_or(f64::NAN),
            val_brier: brier_score(labels, probabilities),
        }
    }
}

/// Area under the ROC curve via the rank-sum statistic, with tied scores
/// sharing their average rank.
///
/// Returns `None` unless both classes are present.
#[must_use]
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Option<f64> {
    let n = labels.len().min(scores.len());
    let n_pos = labels.iter().take(n).filter(|&&y| y == 1).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && scores[order[end]].total_cmp(&scores[order[start]]).is_eq() {
            end += 1;
        }
        // Ranks are 1-based; the tie group spans ranks start+1..=end.
        let average_rank = (start + end + 1) as f64 / 2.0;
        let positives = order[start..end].iter().filter(|&&i| labels[i] == 1).count();
        positive_rank_sum += average_rank * positives as f64;
        start = end;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Some((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Mean squared difference between probability and outcome.
#[must_use]
pub fn brier_score(labels: &[u8], probabilities: &[f64]) -> f64 {
    let n = labels.len().min(probabilities.len());
    if n == 0 {
        return f64::NAN;
    }
    labels
        .iter()
        .zip(probabilities)
        .map(|(&y, &p)| (p - f64::from(y)).powi(2))
        .sum::<f64>()
        / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auc_perfect_and_inverted() {
        let labels = [0, 0, 1, 1];
        assert_eq!(roc_auc(&labels, &[0.1, 0.2, 0.8, 0.9]), Some(1.0));
        assert_eq!(roc_auc(&labels, &[0.9, 0.8, 0.2, 0.1]), Some(0.0));
    }

    #[test]
    fn test_auc_ties() {
        assert_eq!(roc_auc(&[0, 1], &[0.5, 0.5]), Some(0.5));
        // Two pairs ordered, one tied, one inverted.
        assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.1, 0.4, 0.4, 0.35]), Some(0.625));
    }

    #[test]
    fn test_auc_single_class() {
        assert_eq!(roc_auc(&[1, 1], &[0.2, 0.3]), None);
    }

    #[test]
    fn test_brier() {
        let score = brier_score(&[0, 1], &[0.2, 0.6]);
        assert!((score - 0.1).abs() < 1e-12);
        assert!(brier_score(&[], &[]).is_nan());
    }
}
