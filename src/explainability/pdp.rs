//! One-dimensional partial dependence over a raw predictor

use crate::analysis::quantile;
use crate::data::{ColumnKind, Dataset};
use crate::error::{ClinicalError, Result};
use crate::training::FittedModel;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Partial dependence curve of one feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PDPResult {
    pub feature: String,
    pub grid_values: Vec<f64>,
    /// Mean predicted class-1 probability at each grid value
    pub mean_probabilities: Vec<f64>,
    /// Spread of the individual predictions at each grid value
    pub std_probabilities: Vec<f64>,
    /// Centered moving average of `mean_probabilities`
    pub smoothed: Vec<f64>,
}

impl PDPResult {
    pub fn len(&self) -> usize {
        self.grid_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid_values.is_empty()
    }

    /// (grid value, mean probability) pairs
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.grid_values
            .iter()
            .copied()
            .zip(self.mean_probabilities.iter().copied())
            .collect()
    }
}

/// Partial dependence calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialDependence {
    /// Number of grid points for numeric features
    n_grid_points: usize,
    /// Percentile range for grid
    percentile_range: (f64, f64),
    /// Moving-average window (odd)
    smoothing_window: usize,
}

impl Default for PartialDependence {
    fn default() -> Self {
        Self {
            n_grid_points: 20,
            percentile_range: (5.0, 95.0),
            smoothing_window: 5,
        }
    }
}

impl PartialDependence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of grid points
    pub fn with_grid_points(mut self, n: usize) -> Self {
        self.n_grid_points = n.max(2);
        self
    }

    /// Set percentile range for grid
    pub fn with_percentile_range(mut self, low: f64, high: f64) -> Self {
        let (low, high) = (low.clamp(0.0, 100.0), high.clamp(0.0, 100.0));
        self.percentile_range = (low.min(high), low.max(high));
        self
    }

    /// Set the moving-average window; even sizes are rounded up
    pub fn with_smoothing_window(mut self, window: usize) -> Self {
        self.smoothing_window = window.max(1) | 1;
        self
    }

    /// Grid for a feature: evenly spaced between the configured percentiles
    /// for numeric predictors, the observed levels for categorical ones.
    pub fn create_grid(&self, background: &Dataset, feature: &str) -> Result<Vec<f64>> {
        let idx = background.schema().index_of(feature)?;
        let mut values = background.features().column(idx).to_vec();
        values.sort_by(|a, b| a.total_cmp(b));

        if background.schema().predictors[idx].kind == ColumnKind::Categorical {
            values.dedup();
            return Ok(values);
        }

        let lo = quantile(&values, self.percentile_range.0 / 100.0);
        let hi = quantile(&values, self.percentile_range.1 / 100.0);
        let n = self.n_grid_points;
        Ok((0..n).map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64).collect())
    }

    /// Set `feature` to each grid value in every background row and average
    /// the predicted probability. The model and background are left untouched.
    pub fn compute(&self, model: &FittedModel, background: &Dataset, feature: &str) -> Result<PDPResult> {
        if background.is_empty() {
            return Err(ClinicalError::DataError(
                "partial dependence needs at least one background row".to_string(),
            ));
        }
        let idx = background.schema().index_of(feature)?;
        let grid_values = self.create_grid(background, feature)?;
        let n_rows = background.n_rows();

        let stats: Vec<(f64, f64)> = grid_values
            .par_iter()
            .map(|&value| {
                let modified = background.with_column(idx, &vec![value; n_rows])?;
                let probs = model.predict_proba(&modified)?;
                let mean = probs.sum() / n_rows as f64;
                let variance = probs.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n_rows as f64;
                Ok((mean, variance.sqrt()))
            })
            .collect::<Result<_>>()?;

        let (mean_probabilities, std_probabilities): (Vec<f64>, Vec<f64>) = stats.into_iter().unzip();
        let smoothed = moving_average(&mean_probabilities, self.smoothing_window);

        debug!(feature, grid = grid_values.len(), "Computed partial dependence");

        Ok(PDPResult {
            feature: feature.to_string(),
            grid_values,
            mean_probabilities,
            std_probabilities,
            smoothed,
        })
    }

    /// Curves for several features
    pub fn compute_batch(&self, model: &FittedModel, background: &Dataset, features: &[&str]) -> Result<Vec<PDPResult>> {
        features
            .iter()
            .map(|f| self.compute(model, background, f))
            .collect()
    }
}

/// Centered moving average; the window shrinks at the edges
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(values.len());
            values[lo..hi].iter().sum::<f64>() / (hi - lo) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnSpec, Schema};
    use crate::preprocessing::RecipeConfig;
    use crate::training::ModelSpec;
    use ndarray::{Array1, Array2};

    fn dataset() -> Dataset {
        let schema = Schema::new(
            vec![ColumnSpec::numeric("dose"), ColumnSpec::categorical("flag")],
            "y",
        )
        .unwrap();
        let x = Array2::from_shape_fn((40, 2), |(i, j)| if j == 0 { i as f64 } else { (i % 2) as f64 });
        let y = Array1::from_shape_fn(40, |i| if i >= 20 { 1.0 } else { 0.0 });
        Dataset::new(schema, x, y).unwrap()
    }

    fn model(data: &Dataset) -> FittedModel {
        let spec = ModelSpec::LogisticRegression { penalty: 0.1, mixture: 0.0 };
        FittedModel::fit(spec, &RecipeConfig::default(), data, 0).unwrap()
    }

    #[test]
    fn test_moving_average() {
        let smoothed = moving_average(&[0.0, 3.0, 6.0, 9.0], 3);
        assert_eq!(smoothed, vec![1.5, 3.0, 6.0, 7.5]);
        assert_eq!(moving_average(&[1.0, 2.0], 1), vec![1.0, 2.0]);
    }

    #[test]
    fn test_pdp_numeric() {
        let data = dataset();
        let pdp = PartialDependence::new()
            .with_grid_points(15)
            .compute(&model(&data), &data, "dose")
            .unwrap();

        assert_eq!(pdp.len(), 15);
        assert_eq!(pdp.smoothed.len(), 15);
        assert!(pdp.mean_probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(pdp.mean_probabilities[14] > pdp.mean_probabilities[0]);
        assert!(pdp.grid_values[0] > 0.0 && pdp.grid_values[14] < 39.0);
    }

    #[test]
    fn test_pdp_categorical_uses_levels() {
        let data = dataset();
        let grid = PartialDependence::new().create_grid(&data, "flag").unwrap();
        assert_eq!(grid, vec![0.0, 1.0]);
    }

    #[test]
    fn test_unknown_feature() {
        let data = dataset();
        let result = PartialDependence::new().compute(&model(&data), &data, "bmi");
        assert!(matches!(result, Err(ClinicalError::UnknownFeature(_))));
    }
}
