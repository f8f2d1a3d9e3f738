//! Center/scale normalization

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Fitted center and scale for one numeric predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub center: f64,
    pub scale: f64,
}

impl ScalerParams {
    /// Mean and sample standard deviation (n - 1). A zero or undefined std
    /// scales by 1.
    pub fn fit(values: ArrayView1<'_, f64>) -> Self {
        let n = values.len();
        if n == 0 {
            return Self { center: 0.0, scale: 1.0 };
        }
        let mean = values.sum() / n as f64;
        let std = if n > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Self {
            center: mean,
            scale: if std > 0.0 && std.is_finite() { std } else { 1.0 },
        }
    }

    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        (x - self.center) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaling() {
        let values = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let params = ScalerParams::fit(values.view());
        assert_eq!(params.center, 3.0);
        assert!((params.scale - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(params.apply(3.0), 0.0);
        assert!((params.apply(3.0 + params.scale) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column() {
        let values = array![7.0, 7.0, 7.0];
        let params = ScalerParams::fit(values.view());
        assert_eq!(params.scale, 1.0);
        assert_eq!(params.apply(7.0), 0.0);
    }
}
