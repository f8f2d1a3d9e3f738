//! Permutation feature importance over raw predictors

use crate::data::Dataset;
use crate::error::Result;
use crate::training::{accuracy, roc_auc, FittedModel};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Score compared before and after permuting a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceScorer {
    #[default]
    RocAuc,
    Accuracy,
}

impl ImportanceScorer {
    fn score(&self, labels: &Array1<f64>, probabilities: &Array1<f64>) -> Result<f64> {
        match self {
            ImportanceScorer::RocAuc => roc_auc(labels, probabilities),
            ImportanceScorer::Accuracy => {
                let predicted = probabilities.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 });
                Ok(accuracy(labels, &predicted))
            }
        }
    }
}

/// Result of feature importance computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceResult {
    pub feature_names: Vec<String>,
    pub scorer: ImportanceScorer,
    /// Score on the unpermuted data
    pub baseline_score: f64,
    /// Mean drop in score per feature
    pub importances_mean: Vec<f64>,
    pub importances_std: Vec<f64>,
    /// Drop in score per feature and repetition
    pub importances_raw: Vec<Vec<f64>>,
}

impl ImportanceResult {
    /// Feature indices by mean importance, descending; ties keep schema order
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut indexed: Vec<(usize, f64)> = self.importances_mean.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.into_iter().map(|(i, _)| i).collect()
    }

    /// (name, mean, std) for the `k` most important features
    pub fn top_k(&self, k: usize) -> Vec<(String, f64, f64)> {
        self.sorted_indices()
            .into_iter()
            .take(k)
            .map(|i| {
                (
                    self.feature_names[i].clone(),
                    self.importances_mean[i],
                    self.importances_std[i],
                )
            })
            .collect()
    }

    /// Every feature ranked by importance
    pub fn ranking(&self) -> Vec<(String, f64, f64)> {
        self.top_k(self.feature_names.len())
    }

    pub fn importance_of(&self, name: &str) -> Option<f64> {
        self.feature_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.importances_mean[i])
    }
}

/// Permutation importance calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermutationImportance {
    n_repeats: usize,
    seed: u64,
    scorer: ImportanceScorer,
}

impl Default for PermutationImportance {
    fn default() -> Self {
        Self {
            n_repeats: 5,
            seed: 42,
            scorer: ImportanceScorer::RocAuc,
        }
    }
}

impl PermutationImportance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of permutation repeats
    pub fn with_n_repeats(mut self, n_repeats: usize) -> Self {
        self.n_repeats = n_repeats.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_scorer(mut self, scorer: ImportanceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Importance of every raw predictor of `data` for `model`. Each column
    /// is shuffled on a copy; neither the model nor `data` is modified.
    pub fn compute(&self, model: &FittedModel, data: &Dataset) -> Result<ImportanceResult> {
        let labels = data.labels();
        let baseline_score = self.scorer.score(labels, &model.predict_proba(data)?)?;
        let n_features = data.schema().n_predictors();

        let importances_raw: Vec<Vec<f64>> = (0..n_features)
            .into_par_iter()
            .map(|feature_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(feature_idx as u64));
                let mut column: Vec<f64> = data.features().column(feature_idx).to_vec();
                (0..self.n_repeats)
                    .map(|_| {
                        column.shuffle(&mut rng);
                        let permuted = data.with_column(feature_idx, &column)?;
                        let score = self.scorer.score(labels, &model.predict_proba(&permuted)?)?;
                        Ok(baseline_score - score)
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<_>>()?;

        let importances_mean: Vec<f64> = importances_raw
            .iter()
            .map(|scores| scores.iter().sum::<f64>() / scores.len() as f64)
            .collect();
        let importances_std: Vec<f64> = importances_raw
            .iter()
            .zip(&importances_mean)
            .map(|(scores, mean)| {
                let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
                variance.sqrt()
            })
            .collect();

        debug!(
            model = %model.spec(),
            features = n_features,
            repeats = self.n_repeats,
            baseline = baseline_score,
            "Computed permutation importance"
        );

        Ok(ImportanceResult {
            feature_names: data.schema().predictor_names(),
            scorer: self.scorer,
            baseline_score,
            importances_mean,
            importances_std,
            importances_raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(means: Vec<f64>) -> ImportanceResult {
        let n = means.len();
        ImportanceResult {
            feature_names: (0..n).map(|i| format!("f{}", i)).collect(),
            scorer: ImportanceScorer::RocAuc,
            baseline_score: 0.9,
            importances_std: vec![0.0; n],
            importances_raw: means.iter().map(|m| vec![*m]).collect(),
            importances_mean: means,
        }
    }

    #[test]
    fn test_ranking() {
        let r = result(vec![0.01, 0.2, -0.02, 0.05]);
        assert_eq!(r.sorted_indices(), vec![1, 3, 0, 2]);
        let top = r.top_k(2);
        assert_eq!(top[0].0, "f1");
        assert_eq!(top[1].0, "f3");
        assert_eq!(r.importance_of("f2"), Some(-0.02));
        assert_eq!(r.ranking().len(), 4);
    }

    #[test]
    fn test_accuracy_scorer() {
        let labels = ndarray::array![0.0, 1.0, 1.0, 0.0];
        let probs = ndarray::array![0.2, 0.7, 0.4, 0.1];
        assert_eq!(ImportanceScorer::Accuracy.score(&labels, &probs).unwrap(), 0.75);
    }
}
