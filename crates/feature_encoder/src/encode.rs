//! Encoding of the normalized table into a training matrix.

use std::collections::{BTreeSet, HashSet};

use loan_data::{Column, Table};
use loan_structs::TARGET_COLUMN;
use tracing::{debug, info};

use crate::sanitize::{MISSING_CATEGORY, dummy_name, sanitize_feature_name};
use crate::{EncodeError, FeatureMatrix, FeatureSchema};

/// Encoded training data: feature matrix, binary labels and the schema that
/// produced them.
#[derive(Debug, Clone)]
pub struct TrainingFrame {
    pub schema: FeatureSchema,
    pub features: FeatureMatrix,
    pub labels: Vec<u8>,
}

impl TrainingFrame {
    #[must_use]
    pub const fn n_rows(&self) -> usize {
        self.features.n_rows()
    }
}

fn extract_labels(table: &Table) -> Result<Vec<u8>, EncodeError> {
    let target = table
        .column(TARGET_COLUMN)
        .ok_or_else(|| EncodeError::MissingColumn(TARGET_COLUMN.to_string()))?;

    (0..table.n_rows())
        .map(|row| {
            let label = match target {
                Column::Int64(v) => v.get(row).copied().flatten(),
                Column::Float64(v) => v
                    .get(row)
                    .copied()
                    .flatten()
                    .filter(|x| x.fract() == 0.0)
                    .map(|x| x as i64),
                Column::Utf8(_) | Column::Date(_) => None,
            };

            match label {
                Some(0) => Ok(0),
                Some(1) => Ok(1),
                _ => Err(EncodeError::InvalidLabel {
                    row,
                    value: target
                        .display_value(row)
                        .unwrap_or_else(|| "null".to_string()),
                }),
            }
        })
        .collect()
}

fn numeric_values(column: &Column) -> Vec<f64> {
    match column {
        Column::Float64(v) => v.iter().map(|x| x.unwrap_or(f64::NAN)).collect(),
        Column::Int64(v) => v
            .iter()
            .map(|x| x.map_or(f64::NAN, |i| i as f64))
            .collect(),
        Column::Utf8(_) | Column::Date(_) => Vec::new(),
    }
}

/// One-hot columns for a text column: one per distinct value in sorted
/// order, followed by the missing indicator.
fn dummy_columns(name: &str, values: &[Option<String>]) -> Vec<(String, Vec<f64>)> {
    let categories: BTreeSet<&str> = values.iter().filter_map(Option::as_deref).collect();

    let mut columns: Vec<(String, Vec<f64>)> = categories
        .into_iter()
        .map(|category| {
            let indicator = values
                .iter()
                .map(|v| f64::from(u8::from(v.as_deref() == Some(category))))
                .collect();
            (dummy_name(name, category), indicator)
        })
        .collect();

    let missing = values
        .iter()
        .map(|v| f64::from(u8::from(v.is_none())))
        .collect();
    columns.push((dummy_name(name, MISSING_CATEGORY), missing));

    columns
}

/// Encodes the normalized table for training.
///
/// Numeric columns pass through as-is with missing values as NaN. Text
/// columns are expanded into indicators. Date columns and the target are
/// not features. Feature names are sanitized and, when two names collapse
/// to the same string, the first column wins.
///
/// # Errors
///
/// Returns an error if the target column is missing or holds a value other
/// than 0 or 1.
pub fn encode_training(table: &Table) -> Result<TrainingFrame, EncodeError> {
    let labels = extract_labels(table)?;
    let n_rows = table.n_rows();

    let mut numeric_columns = Vec::new();
    let mut categorical_columns = Vec::new();
    let mut raw_numeric = Vec::new();
    let mut raw_dummies = Vec::new();

    for (name, column) in table.iter() {
        if name == TARGET_COLUMN {
            continue;
        }

        match column {
            Column::Float64(_) | Column::Int64(_) => {
                numeric_columns.push(name.to_string());
                raw_numeric.push((name.to_string(), numeric_values(column)));
            }
            Column::Utf8(values) => {
                categorical_columns.push(name.to_string());
                raw_dummies.extend(dummy_columns(name, values));
            }
            Column::Date(_) => debug!(column = name, "Skipping date column"),
        }
    }

    let mut seen = HashSet::new();
    let mut features = FeatureMatrix::with_rows(n_rows);

    for (name, values) in raw_numeric.into_iter().chain(raw_dummies) {
        let name = sanitize_feature_name(&name);
        if seen.insert(name.clone()) {
            features.push_column(name, values)?;
        } else {
            debug!(feature = %name, "Dropping duplicate feature name");
        }
    }

    let schema = FeatureSchema::new(
        features.names().to_vec(),
        numeric_columns,
        categorical_columns,
    );

    info!(
        rows = n_rows,
        features = schema.len(),
        "Encoded training features"
    );

    Ok(TrainingFrame {
        schema,
        features,
        labels,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::FeatureValue;

    fn text(values: &[Option<&str>]) -> Column {
        Column::Utf8(values.iter().map(|v| v.map(str::to_string)).collect())
    }

    fn sample_table() -> Table {
        let mut table = Table::new();
        table
            .push_column("loan_amnt", Column::Float64(vec![Some(1000.0), None, Some(3000.0)]))
            .expect("push");
        table
            .push_column("grade", text(&[Some("B"), Some("A"), None]))
            .expect("push");
        table
            .push_column("emp_length", text(&[Some("10+ years"), Some("< 1 year"), Some("10+ years")]))
            .expect("push");
        table
            .push_column(
                "issue_d",
                Column::Date(vec![NaiveDate::from_ymd_opt(2015, 12, 1); 3]),
            )
            .expect("push");
        table
            .push_column(TARGET_COLUMN, Column::Int64(vec![Some(0), Some(1), Some(0)]))
            .expect("push");
        table
    }

    #[test]
    fn test_feature_layout() {
        let frame = encode_training(&sample_table()).expect("encode");

        assert_eq!(
            frame.schema.feature_names(),
            [
                "loan_amnt",
                "grade_A",
                "grade_B",
                "grade_nan",
                "emp_length_10_years",
                "emp_length__1_year",
                "emp_length_nan",
            ]
        );
        assert_eq!(frame.labels, vec![0, 1, 0]);
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.schema.numeric_columns(), ["loan_amnt"]);
        assert_eq!(frame.schema.categorical_columns(), ["grade", "emp_length"]);
    }

    #[test]
    fn test_missing_values() {
        let frame = encode_training(&sample_table()).expect("encode");

        assert!(frame.features.column(0)[1].is_nan());
        assert_eq!(frame.features.column(3), [0.0, 0.0, 1.0]);
        assert_eq!(frame.features.column(1), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_scoring_matches_training_row() {
        let frame = encode_training(&sample_table()).expect("encode");

        let record: BTreeMap<String, FeatureValue> = [
            ("loan_amnt".to_string(), FeatureValue::Number(1000.0)),
            ("grade".to_string(), FeatureValue::Text("B".into())),
            ("emp_length".to_string(), FeatureValue::Text("10+ years".into())),
        ]
        .into_iter()
        .collect();

        let mut row = Vec::new();
        frame.features.row_into(0, &mut row);
        assert_eq!(frame.schema.transform(&record), row);
    }

    #[test]
    fn test_colliding_names_keep_first() {
        let mut table = Table::new();
        table
            .push_column("purpose", text(&[Some("a b"), Some("a-b")]))
            .expect("push");
        table
            .push_column(TARGET_COLUMN, Column::Int64(vec![Some(0), Some(1)]))
            .expect("push");

        let frame = encode_training(&table).expect("encode");

        assert_eq!(frame.schema.feature_names(), ["purpose_a_b", "purpose_nan"]);
        assert_eq!(frame.features.column(0), [1.0, 0.0]);
    }

    #[test]
    fn test_invalid_label() {
        let mut table = Table::new();
        table
            .push_column(TARGET_COLUMN, Column::Int64(vec![Some(0), Some(2)]))
            .expect("push");

        assert!(matches!(
            encode_training(&table),
            Err(EncodeError::InvalidLabel { row: 1, .. })
        ));
    }

    #[test]
    fn test_missing_target() {
        let table = Table::new();
        assert!(matches!(
            encode_training(&table),
            Err(EncodeError::MissingColumn(_))
        ));
    }
}
