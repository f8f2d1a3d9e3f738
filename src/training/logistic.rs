//! Elastic-net penalized logistic regression

use crate::error::{ClinicalError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Probabilities are clamped away from 0 and 1 when forming IRLS weights
const PROB_EPS: f64 = 1e-5;

/// Binary logistic regression minimizing
/// `-(1/n)·loglik + penalty·((1 - mixture)/2·‖β‖² + mixture·‖β‖₁)`
/// with an unpenalized intercept.
///
/// Fitted by iteratively reweighted least squares; each weighted least-squares
/// subproblem is solved by cyclic coordinate descent with soft-thresholding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Overall regularization strength
    pub penalty: f64,
    /// Elastic-net mixture (0 = ridge, 1 = lasso)
    pub mixture: f64,
    /// Maximum IRLS iterations
    pub max_iter: usize,
    /// Maximum coordinate-descent sweeps per IRLS iteration
    pub max_sweeps: usize,
    /// Tolerance on the largest coefficient change within a sweep; IRLS
    /// stops once an outer step moves no coefficient by more than
    /// `10 * tol * (1 + max |coefficient|)`
    pub tol: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(0.01, 0.0)
    }
}

impl LogisticRegression {
    pub fn new(penalty: f64, mixture: f64) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            penalty,
            mixture: mixture.clamp(0.0, 1.0),
            max_iter: 100,
            max_sweeps: 1000,
            tol: 1e-7,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    #[inline]
    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    fn soft_threshold(val: f64, threshold: f64) -> f64 {
        if val > threshold {
            val - threshold
        } else if val < -threshold {
            val + threshold
        } else {
            0.0
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(ClinicalError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ClinicalError::TrainingError("no training rows".to_string()));
        }
        if !(self.penalty >= 0.0 && self.penalty.is_finite()) {
            return Err(ClinicalError::ConfigurationError(format!(
                "penalty must be a finite non-negative number, got {}",
                self.penalty
            )));
        }

        let n = n_samples as f64;
        let l1 = self.penalty * self.mixture;
        let l2 = self.penalty * (1.0 - self.mixture);

        let mut beta = Array1::<f64>::zeros(n_features);
        let y_mean = (y.sum() / n).clamp(PROB_EPS, 1.0 - PROB_EPS);
        let mut b0 = (y_mean / (1.0 - y_mean)).ln();

        let mut converged = false;
        let mut iterations = 0;

        for _iter in 0..self.max_iter {
            iterations += 1;
            let eta = x.dot(&beta) + b0;

            // Quadratic approximation around the current fit
            let mut w = Array1::<f64>::zeros(n_samples);
            let mut z = Array1::<f64>::zeros(n_samples);
            for i in 0..n_samples {
                let p = Self::sigmoid(eta[i]).clamp(PROB_EPS, 1.0 - PROB_EPS);
                w[i] = p * (1.0 - p);
                z[i] = eta[i] + (y[i] - p) / w[i];
            }

            let beta_old = beta.clone();
            let b0_old = b0;

            // Working residual r = z - eta, kept in sync with every coordinate update
            let mut r = &z - &eta;
            let w_sum = w.sum();
            let col_wss: Vec<f64> = (0..n_features)
                .map(|j| x.column(j).iter().zip(w.iter()).map(|(v, wi)| wi * v * v).sum::<f64>() / n)
                .collect();

            for _sweep in 0..self.max_sweeps {
                let mut max_delta = 0.0f64;

                let delta0 = r.iter().zip(w.iter()).map(|(ri, wi)| wi * ri).sum::<f64>() / w_sum;
                if delta0 != 0.0 {
                    b0 += delta0;
                    r.mapv_inplace(|ri| ri - delta0);
                    max_delta = max_delta.max(delta0.abs());
                }

                for j in 0..n_features {
                    let denom = col_wss[j] + l2;
                    if denom < 1e-15 {
                        beta[j] = 0.0;
                        continue;
                    }
                    let col = x.column(j);
                    let rho = col
                        .iter()
                        .zip(r.iter())
                        .zip(w.iter())
                        .map(|((xij, ri), wi)| wi * xij * ri)
                        .sum::<f64>()
                        / n
                        + col_wss[j] * beta[j];
                    let new_bj = Self::soft_threshold(rho, l1) / denom;
                    let delta = new_bj - beta[j];
                    if delta != 0.0 {
                        beta[j] = new_bj;
                        r.zip_mut_with(&col, |ri, xij| *ri -= delta * xij);
                        max_delta = max_delta.max(delta.abs());
                    }
                }

                if max_delta < self.tol {
                    break;
                }
            }

            if !b0.is_finite() || beta.iter().any(|b| !b.is_finite()) {
                return Err(ClinicalError::ConvergenceError { iterations });
            }

            let change = (&beta - &beta_old)
                .iter()
                .fold((b0 - b0_old).abs(), |acc, d| acc.max(d.abs()));
            let scale = beta.iter().fold(b0.abs(), |acc, b| acc.max(b.abs()));
            if change < self.tol * 10.0 * (1.0 + scale) {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(ClinicalError::ConvergenceError { iterations });
        }

        self.coefficients = Some(beta);
        self.intercept = Some(b0);
        Ok(self)
    }

    /// Probability of class 1 for each row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(ClinicalError::ModelNotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(ClinicalError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        let intercept = self.intercept.unwrap_or(0.0);
        Ok((x.dot(coefficients) + intercept).mapv(Self::sigmoid))
    }

    /// Number of non-zero coefficients
    pub fn n_active(&self) -> usize {
        self.coefficients
            .as_ref()
            .map_or(0, |c| c.iter().filter(|b| **b != 0.0).count())
    }
}
