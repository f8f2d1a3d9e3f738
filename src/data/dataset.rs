//! Immutable typed dataset

use super::schema::{ColumnKind, Schema};
use crate::error::{ClinicalError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rows sharing one schema: predictors in schema order plus a {0,1} label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    schema: Schema,
    features: Array2<f64>,
    labels: Array1<f64>,
}

impl Dataset {
    /// Build a dataset, validating shape, finiteness and value domains.
    ///
    /// Missing (NaN) or out-of-range values are configuration errors: no
    /// imputation policy exists.
    pub fn new(schema: Schema, features: Array2<f64>, labels: Array1<f64>) -> Result<Self> {
        schema.validate()?;

        if features.ncols() != schema.n_predictors() {
            return Err(ClinicalError::ShapeError {
                expected: format!("{} predictor columns", schema.n_predictors()),
                actual: format!("{} columns", features.ncols()),
            });
        }
        if features.nrows() != labels.len() {
            return Err(ClinicalError::ShapeError {
                expected: format!("labels length = {}", features.nrows()),
                actual: format!("labels length = {}", labels.len()),
            });
        }

        for (j, spec) in schema.predictors.iter().enumerate() {
            for (i, &v) in features.column(j).iter().enumerate() {
                if !v.is_finite() {
                    return Err(ClinicalError::ConfigurationError(format!(
                        "missing or non-finite value in column '{}' at row {}",
                        spec.name, i
                    )));
                }
                if spec.kind == ColumnKind::Categorical {
                    let integral = (v - v.round()).abs() < 1e-9;
                    let in_domain = !schema.binary_categoricals || v == 0.0 || v == 1.0;
                    if !integral || !in_domain {
                        return Err(ClinicalError::ConfigurationError(format!(
                            "out-of-range level {} in categorical column '{}' at row {}",
                            v, spec.name, i
                        )));
                    }
                }
            }
        }

        for (i, &v) in labels.iter().enumerate() {
            if v != 0.0 && v != 1.0 {
                return Err(ClinicalError::ConfigurationError(format!(
                    "outcome '{}' must be 0 or 1, got {} at row {}",
                    schema.outcome, v, i
                )));
            }
        }

        Ok(Self { schema, features, labels })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.labels
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Column view by predictor name
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self.schema.index_of(name)?;
        Ok(self.features.column(idx))
    }

    /// New dataset holding the given rows, in the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// New dataset with one predictor column replaced.
    ///
    /// Used by the explainer to build perturbed copies; the original is left
    /// untouched.
    pub fn with_column(&self, idx: usize, values: &[f64]) -> Result<Self> {
        if idx >= self.schema.n_predictors() {
            return Err(ClinicalError::UnknownFeature(format!("column index {}", idx)));
        }
        if values.len() != self.n_rows() {
            return Err(ClinicalError::ShapeError {
                expected: format!("{} values", self.n_rows()),
                actual: format!("{} values", values.len()),
            });
        }
        let mut features = self.features.clone();
        for (dst, &v) in features.column_mut(idx).iter_mut().zip(values) {
            *dst = v;
        }
        Ok(Self {
            schema: self.schema.clone(),
            features,
            labels: self.labels.clone(),
        })
    }

    /// Row counts per outcome class, keyed by class (0 or 1)
    pub fn class_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for &v in self.labels.iter() {
            *counts.entry(v.round() as i64).or_insert(0) += 1;
        }
        counts
    }

    /// Fraction of rows with outcome 1
    pub fn positive_rate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.labels.sum() / self.n_rows() as f64
    }

    /// Accuracy of always predicting the most frequent class
    pub fn majority_baseline(&self) -> f64 {
        let p = self.positive_rate();
        p.max(1.0 - p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::ColumnSpec;
    use ndarray::array;

    fn schema() -> Schema {
        Schema::new(
            vec![ColumnSpec::numeric("x"), ColumnSpec::categorical("flag")],
            "y",
        )
        .unwrap()
    }

    #[test]
    fn test_new_and_select() {
        let ds = Dataset::new(
            schema(),
            array![[1.0, 0.0], [2.0, 1.0], [3.0, 1.0]],
            array![0.0, 1.0, 1.0],
        )
        .unwrap();
        assert_eq!(ds.n_rows(), 3);

        let sub = ds.select(&[2, 0]);
        assert_eq!(sub.features()[[0, 0]], 3.0);
        assert_eq!(sub.labels()[1], 0.0);
        assert_eq!(ds.n_rows(), 3);
    }

    #[test]
    fn test_missing_value_rejected() {
        let result = Dataset::new(schema(), array![[f64::NAN, 0.0]], array![0.0]);
        assert!(matches!(result, Err(ClinicalError::ConfigurationError(_))));
    }

    #[test]
    fn test_out_of_range_flag_rejected() {
        let result = Dataset::new(schema(), array![[1.0, 2.0]], array![0.0]);
        assert!(matches!(result, Err(ClinicalError::ConfigurationError(_))));

        let result = Dataset::new(schema(), array![[1.0, 1.0]], array![3.0]);
        assert!(matches!(result, Err(ClinicalError::ConfigurationError(_))));
    }

    #[test]
    fn test_with_column_leaves_original() {
        let ds = Dataset::new(schema(), array![[1.0, 0.0], [2.0, 1.0]], array![0.0, 1.0]).unwrap();
        let changed = ds.with_column(0, &[9.0, 9.0]).unwrap();
        assert_eq!(changed.features()[[1, 0]], 9.0);
        assert_eq!(ds.features()[[1, 0]], 2.0);
    }

    #[test]
    fn test_class_counts_and_baseline() {
        let ds = Dataset::new(
            schema(),
            array![[1.0, 0.0], [2.0, 1.0], [3.0, 1.0], [4.0, 0.0]],
            array![0.0, 0.0, 0.0, 1.0],
        )
        .unwrap();
        let counts = ds.class_counts();
        assert_eq!(counts[&0], 3);
        assert_eq!(counts[&1], 1);
        assert!((ds.majority_baseline() - 0.75).abs() < 1e-12);
    }
}
