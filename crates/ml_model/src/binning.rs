//! Histogram binning of feature columns.
//!
//! Every feature is mapped to at most `max_bins` value bins plus bin 0,
//! which holds missing (non-finite) values. A value lands in value bin `b`
//! (1-based) when it is at most the `b`-th upper bound, so a split after bin
//! `b` is exactly the raw-value test `x <= upper_bound(b)`.

use feature_encoder::FeatureMatrix;
use rayon::prelude::*;

/// Bin index reserved for missing values.
pub const MISSING_BIN: u8 = 0;

/// Largest number of value bins a feature may use.
pub const MAX_VALUE_BINS: usize = u8::MAX as usize;

/// Bin boundaries of one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct BinMapper {
    upper_bounds: Vec<f64>,
}

impl BinMapper {
    /// Derives bin boundaries from the finite values of a column.
    ///
    /// Columns with few distinct values get one bin per value, split at
    /// midpoints. Larger columns are cut at quantiles.
    #[must_use]
    pub fn fit(values: &[f64], max_bins: usize) -> Self {
        let max_bins = max_bins.clamp(2, MAX_VALUE_BINS);

        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let mut distinct = sorted.clone();
        distinct.dedup();

        let upper_bounds = if distinct.len() <= max_bins {
            distinct.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
        } else {
            let mut bounds: Vec<f64> = (1..max_bins)
                .map(|i| sorted[i * sorted.len() / max_bins])
                .collect();
            bounds.dedup();
            // The largest value must stay in the open-ended last bin.
            if bounds.last().is_some_and(|&b| Some(&b) == sorted.last()) {
                bounds.pop();
            }
            bounds
        };

        Self { upper_bounds }
    }

    /// Number of bins including the missing bin.
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.upper_bounds.len() + 2
    }

    #[must_use]
    pub fn bin(&self, value: f64) -> u8 {
        if !value.is_finite() {
            return MISSING_BIN;
        }
        let index = self.upper_bounds.partition_point(|&bound| bound < value);
        (index + 1) as u8
    }

    /// Raw threshold of a split placed after value bin `bin`.
    #[must_use]
    pub fn upper_bound(&self, bin: u8) -> f64 {
        let index = usize::from(bin).saturating_sub(1);
        self.upper_bounds.get(index).copied().unwrap_or(f64::INFINITY)
    }
}

/// Column-major bin indices for a whole feature matrix.
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    mappers: Vec<BinMapper>,
    bins: Vec<Vec<u8>>,
    n_rows: usize,
}

impl BinnedMatrix {
    /// Bins every feature of `features`, one feature per rayon task.
    #[must_use]
    pub fn build(features: &FeatureMatrix, max_bins: usize) -> Self {
        let (mappers, bins): (Vec<BinMapper>, Vec<Vec<u8>>) = (0..features.n_features())
            .into_par_iter()
            .map(|feature| {
                let column = features.column(feature);
                let mapper = BinMapper::fit(column, max_bins);
                let bins: Vec<u8> = column.iter().map(|&v| mapper.bin(v)).collect();
                (mapper, bins)
            })
            .unzip();

        Self {
            mappers,
            bins,
            n_rows: features.n_rows(),
        }
    }

    #[must_use]
    pub const fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mappers.len()
    }

    #[must_use]
    pub fn mapper(&self, feature: usize) -> &BinMapper {
        &self.mappers[feature]
    }

    #[must_use]
    pub fn column(&self, feature: usize) -> &[u8] {
        &self.bins[feature]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_few_distinct_values_use_midpoints() {
        let mapper = BinMapper::fit(&[1.0, 2.0, 2.0, 4.0, f64::NAN], 255);

        assert_eq!(mapper.n_bins(), 4);
        assert_eq!(mapper.bin(f64::NAN), MISSING_BIN);
        assert_eq!(mapper.bin(1.0), 1);
        assert_eq!(mapper.bin(2.0), 2);
        assert_eq!(mapper.bin(4.0), 3);
        assert_eq!(mapper.bin(100.0), 3);
        assert!((mapper.upper_bound(1) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bin_matches_threshold() {
        let values: Vec<f64> = (0..1000_i32).map(|i| f64::from(i) * 0.37).collect();
        let mapper = BinMapper::fit(&values, 16);

        assert!(mapper.n_bins() <= 16 + 1);
        for bin in 1..(mapper.n_bins() as u8 - 1) {
            let threshold = mapper.upper_bound(bin);
            for &v in &values {
                assert_eq!(mapper.bin(v) <= bin, v <= threshold);
            }
        }
    }

    #[test]
    fn test_constant_column_has_single_value_bin() {
        let mapper = BinMapper::fit(&[3.0; 10], 255);
        assert_eq!(mapper.n_bins(), 2);
        assert_eq!(mapper.bin(3.0), 1);
    }

    #[test]
    fn test_binned_matrix_shape() {
        let features = FeatureMatrix::from_columns(
            3,
            [
                ("a".to_string(), vec![1.0, f64::NAN, 3.0]),
                ("b".to_string(), vec![0.0, 1.0, 0.0]),
            ],
        )
        .expect("matrix");

        let binned = BinnedMatrix::build(&features, 255);

        assert_eq!(binned.n_rows(), 3);
        assert_eq!(binned.n_features(), 2);
        assert_eq!(binned.column(0), [1, MISSING_BIN, 2]);
        assert_eq!(binned.column(1), [1, 2, 1]);
    }
}
