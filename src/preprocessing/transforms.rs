//! Yeo-Johnson power transform with maximum-likelihood lambda

use serde::{Deserialize, Serialize};

const LAMBDA_MIN: f64 = -5.0;
const LAMBDA_MAX: f64 = 5.0;
const GRID_STEP: f64 = 0.25;
const GOLDEN_TOL: f64 = 1e-6;

/// Fitted Yeo-Johnson transform for one numeric predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YeoJohnson {
    pub lambda: f64,
}

impl Default for YeoJohnson {
    /// Lambda 1 is the identity
    fn default() -> Self {
        Self { lambda: 1.0 }
    }
}

impl YeoJohnson {
    /// Estimate lambda on [-5, 5]: coarse grid search, then golden-section
    /// refinement around the best grid point. Constant inputs keep lambda 1.
    pub fn fit(values: &[f64]) -> Self {
        if values.len() < 2 {
            return Self::default();
        }

        let steps = ((LAMBDA_MAX - LAMBDA_MIN) / GRID_STEP).round() as usize;
        let mut best_lambda = 1.0;
        let mut best_ll = f64::NEG_INFINITY;
        for i in 0..=steps {
            let lambda = LAMBDA_MIN + i as f64 * GRID_STEP;
            let ll = log_likelihood(values, lambda);
            if ll > best_ll {
                best_ll = ll;
                best_lambda = lambda;
            }
        }

        if !best_ll.is_finite() {
            return Self::default();
        }

        let lo = (best_lambda - GRID_STEP).max(LAMBDA_MIN);
        let hi = (best_lambda + GRID_STEP).min(LAMBDA_MAX);
        let refined = golden_section_max(|l| log_likelihood(values, l), lo, hi);
        let lambda = if log_likelihood(values, refined) >= best_ll {
            refined
        } else {
            best_lambda
        };

        Self { lambda }
    }

    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        transform_value(x, self.lambda)
    }
}

/// Yeo-Johnson transform of a single value
pub fn transform_value(x: f64, lambda: f64) -> f64 {
    if x >= 0.0 {
        if lambda.abs() < 1e-10 {
            x.ln_1p()
        } else {
            ((x + 1.0).powf(lambda) - 1.0) / lambda
        }
    } else if (lambda - 2.0).abs() < 1e-10 {
        -(-x).ln_1p()
    } else {
        -(((1.0 - x).powf(2.0 - lambda) - 1.0) / (2.0 - lambda))
    }
}

/// Profile log-likelihood of lambda under a normal model of the transformed values
fn log_likelihood(values: &[f64], lambda: f64) -> f64 {
    let n = values.len() as f64;
    let transformed: Vec<f64> = values.iter().map(|&x| transform_value(x, lambda)).collect();
    if transformed.iter().any(|t| !t.is_finite()) {
        return f64::NEG_INFINITY;
    }

    let mean = transformed.iter().sum::<f64>() / n;
    let variance = transformed.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
    if variance <= 0.0 || !variance.is_finite() {
        return f64::NEG_INFINITY;
    }

    let log_jacobian: f64 = values.iter().map(|&x| x.abs().ln_1p().copysign(x)).sum();
    -n / 2.0 * variance.ln() + (lambda - 1.0) * log_jacobian
}

fn golden_section_max<F: Fn(f64) -> f64>(f: F, mut a: f64, mut b: f64) -> f64 {
    let inv_phi = (5f64.sqrt() - 1.0) / 2.0;
    let mut c = b - inv_phi * (b - a);
    let mut d = a + inv_phi * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);

    while (b - a).abs() > GOLDEN_TOL {
        if fc > fd {
            b = d;
            d = c;
            fd = fc;
            c = b - inv_phi * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + inv_phi * (b - a);
            fd = f(d);
        }
    }
    (a + b) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_at_lambda_one() {
        for x in [-3.0, -0.5, 0.0, 0.5, 10.0] {
            assert!((transform_value(x, 1.0) - x).abs() < 1e-12);
        }
    }

    #[test]
    fn test_log_branches() {
        assert!((transform_value(1.0, 0.0) - 2f64.ln()).abs() < 1e-12);
        assert!((transform_value(-1.0, 2.0) + 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_monotone() {
        let yj = YeoJohnson { lambda: -1.3 };
        let xs = [-4.0, -1.0, 0.0, 0.3, 2.0, 8.0];
        for w in xs.windows(2) {
            assert!(yj.apply(w[0]) < yj.apply(w[1]));
        }
    }

    #[test]
    fn test_right_skew_gets_lambda_below_one() {
        let values: Vec<f64> = (0..200).map(|i| (i as f64 / 40.0).exp()).collect();
        let yj = YeoJohnson::fit(&values);
        assert!(yj.lambda < 1.0);
        assert!(yj.lambda >= LAMBDA_MIN && yj.lambda <= LAMBDA_MAX);
    }

    #[test]
    fn test_constant_keeps_identity() {
        let yj = YeoJohnson::fit(&[2.0; 10]);
        assert_eq!(yj.lambda, 1.0);
    }
}
