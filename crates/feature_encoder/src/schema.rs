//! The ordered feature schema shared by training and scoring.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::sanitize::{MISSING_CATEGORY, dummy_name, sanitize_feature_name};

/// A raw feature value supplied at scoring time.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Missing,
}

impl FeatureValue {
    fn as_number(&self) -> f64 {
        match self {
            Self::Number(x) => *x,
            Self::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Missing => f64::NAN,
        }
    }

    fn as_category(&self) -> Option<String> {
        match self {
            Self::Number(x) => Some(x.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Missing => None,
        }
    }
}

impl From<&serde_json::Value> for FeatureValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Missing,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Missing, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Column layout of the feature matrix a model was trained on.
///
/// `feature_names` is the authoritative contract: scoring always produces a
/// vector with exactly these columns in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    feature_names: Vec<String>,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
}

impl FeatureSchema {
    /// Creates a schema from its parts.
    #[must_use]
    pub const fn new(
        feature_names: Vec<String>,
        numeric_columns: Vec<String>,
        categorical_columns: Vec<String>,
    ) -> Self {
        Self {
            feature_names,
            numeric_columns,
            categorical_columns,
        }
    }

    /// Ordered model input columns.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Source columns passed through as numbers.
    #[must_use]
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Source columns expanded into one-hot indicators.
    #[must_use]
    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.feature_names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.feature_names.is_empty()
    }

    /// Encodes one record the same way the training table was encoded.
    ///
    /// Numeric pass-through columns come first, then the indicators of each
    /// categorical column present in the record. Names are sanitized and
    /// collapsed first-wins. Keys the schema does not know are ignored.
    #[must_use]
    pub fn encode_record(&self, record: &BTreeMap<String, FeatureValue>) -> Vec<(String, f64)> {
        let mut encoded = Vec::new();

        for column in &self.numeric_columns {
            if let Some(value) = record.get(column) {
                encoded.push((column.clone(), value.as_number()));
            }
        }

        for column in &self.categorical_columns {
            let Some(value) = record.get(column) else {
                continue;
            };

            match value.as_category() {
                Some(category) => {
                    encoded.push((dummy_name(column, &category), 1.0));
                    encoded.push((dummy_name(column, MISSING_CATEGORY), 0.0));
                }
                None => encoded.push((dummy_name(column, MISSING_CATEGORY), 1.0)),
            }
        }

        let mut seen = HashSet::new();
        encoded
            .into_iter()
            .map(|(name, value)| (sanitize_feature_name(&name), value))
            .filter(|(name, _)| seen.insert(name.clone()))
            .collect()
    }

    /// Aligns encoded columns to the schema.
    ///
    /// Schema columns absent from `encoded` are zero; encoded columns the
    /// schema does not list are dropped.
    #[must_use]
    pub fn reindex(&self, encoded: &[(String, f64)]) -> Vec<f64> {
        let lookup: HashMap<&str, f64> = encoded
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();

        self.feature_names
            .iter()
            .map(|name| lookup.get(name.as_str()).copied().unwrap_or(0.0))
            .collect()
    }

    /// Encodes and aligns one record in a single step.
    #[must_use]
    pub fn transform(&self, record: &BTreeMap<String, FeatureValue>) -> Vec<f64> {
        self.reindex(&self.encode_record(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(
            vec![
                "loan_amnt".into(),
                "term".into(),
                "grade_A".into(),
                "grade_B".into(),
                "grade_nan".into(),
                "emp_length_10_years".into(),
                "emp_length_nan".into(),
            ],
            vec!["loan_amnt".into(), "term".into()],
            vec!["grade".into(), "emp_length".into()],
        )
    }

    fn record(pairs: &[(&str, FeatureValue)]) -> BTreeMap<String, FeatureValue> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_transform_known_values() {
        let vector = schema().transform(&record(&[
            ("loan_amnt", FeatureValue::Number(10000.0)),
            ("term", FeatureValue::Text("36".into())),
            ("grade", FeatureValue::Text("B".into())),
            ("emp_length", FeatureValue::Text("10+ years".into())),
        ]));

        assert_eq!(vector, vec![10000.0, 36.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_absent_columns_are_zero_and_unknown_dropped() {
        let vector = schema().transform(&record(&[
            ("grade", FeatureValue::Text("Z".into())),
            ("favourite_colour", FeatureValue::Text("blue".into())),
        ]));

        assert_eq!(vector, vec![0.0; 7]);
    }

    #[test]
    fn test_explicit_null_sets_missing_indicator() {
        let vector = schema().transform(&record(&[
            ("loan_amnt", FeatureValue::Missing),
            ("grade", FeatureValue::Missing),
        ]));

        assert!(vector.first().is_some_and(|x| x.is_nan()));
        assert_eq!(vector.get(4), Some(&1.0));
        assert_eq!(vector.get(2), Some(&0.0));
    }

    #[test]
    fn test_reindex_law_holds_for_any_categories() {
        let schema = schema();
        for grade in ["A", "B", "C", "", "weird value!"] {
            let encoded = schema.encode_record(&record(&[("grade", FeatureValue::Text(grade.into()))]));
            let vector = schema.reindex(&encoded);
            assert_eq!(vector.len(), schema.len());
        }
    }

    #[test]
    fn test_json_values_convert() {
        let json: serde_json::Value = serde_json::json!({
            "a": 1.5, "b": "x", "c": null, "d": true
        });
        let object = json.as_object().expect("object");

        assert_eq!(FeatureValue::from(&object["a"]), FeatureValue::Number(1.5));
        assert_eq!(FeatureValue::from(&object["b"]), FeatureValue::Text("x".into()));
        assert_eq!(FeatureValue::from(&object["c"]), FeatureValue::Missing);
        assert_eq!(FeatureValue::from(&object["d"]), FeatureValue::Bool(true));
    }

    #[test]
    fn test_schema_serde_roundtrip() {
        let schema = schema();
        let json = serde_json::to_string(&schema).expect("serialize");
        let back: FeatureSchema = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, schema);
    }
}
