//! Stratified train/test splitting and stratified k-fold resampling

use crate::error::{ClinicalError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Offset separating the fold stream from the train/test stream
const FOLD_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Disjoint, covering train/test row indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// One resampling fold: the model is fitted on `analysis` and scored on `assessment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CVSplit {
    pub analysis: Vec<usize>,
    pub assessment: Vec<usize>,
    pub fold_idx: usize,
}

/// Label-stratified splitter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratifiedSplitter {
    train_fraction: f64,
    n_folds: usize,
    seed: u64,
}

impl Default for StratifiedSplitter {
    fn default() -> Self {
        Self {
            train_fraction: 0.75,
            n_folds: 5,
            seed: 42,
        }
    }
}

impl StratifiedSplitter {
    pub fn new(train_fraction: f64, n_folds: usize, seed: u64) -> Self {
        Self {
            train_fraction,
            n_folds,
            seed,
        }
    }

    pub fn with_train_fraction(mut self, fraction: f64) -> Self {
        self.train_fraction = fraction;
        self
    }

    pub fn with_n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Split rows into Train and Test, allocating `round(n_class × fraction)`
    /// rows of every class to Train.
    pub fn split(&self, labels: &Array1<f64>) -> Result<TrainTestSplit> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ClinicalError::ConfigurationError(format!(
                "train fraction must be in (0, 1), got {}",
                self.train_fraction
            )));
        }

        let classes = class_indices(labels);
        if classes.len() < 2 {
            return Err(ClinicalError::ConfigurationError(
                "stratified split needs at least two outcome classes".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut train = Vec::new();
        let mut test = Vec::new();

        for mut indices in classes.into_values() {
            indices.shuffle(&mut rng);
            let n = indices.len();
            let mut n_train = (n as f64 * self.train_fraction).round() as usize;
            if n >= 2 {
                n_train = n_train.clamp(1, n - 1);
            }
            train.extend_from_slice(&indices[..n_train]);
            test.extend_from_slice(&indices[n_train..]);
        }

        train.sort_unstable();
        test.sort_unstable();
        Ok(TrainTestSplit { train, test })
    }

    /// Stratified folds over `labels` (typically the Train rows). Indices are
    /// positions within `labels`.
    pub fn folds(&self, labels: &Array1<f64>) -> Result<Vec<CVSplit>> {
        let k = self.n_folds;
        if k < 2 {
            return Err(ClinicalError::ConfigurationError(format!(
                "fold count must be at least 2, got {}",
                k
            )));
        }

        let classes = class_indices(labels);
        if classes.len() < 2 {
            return Err(ClinicalError::ConfigurationError(
                "stratified folds need at least two outcome classes".to_string(),
            ));
        }
        let minority = classes.values().map(Vec::len).min().unwrap_or(0);
        if k > minority {
            return Err(ClinicalError::ConfigurationError(format!(
                "fold count {} exceeds minority class size {}",
                k, minority
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(FOLD_STREAM));
        let mut assignments: Vec<Vec<usize>> = vec![Vec::new(); k];
        // Continue the round-robin across classes so fold sizes differ by at most one
        let mut next = 0;
        for mut indices in classes.into_values() {
            indices.shuffle(&mut rng);
            for idx in indices {
                assignments[next % k].push(idx);
                next += 1;
            }
        }

        let splits = (0..k)
            .map(|fold_idx| {
                let mut assessment = assignments[fold_idx].clone();
                assessment.sort_unstable();
                let mut analysis: Vec<usize> = assignments
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                analysis.sort_unstable();
                CVSplit {
                    analysis,
                    assessment,
                    fold_idx,
                }
            })
            .collect();

        Ok(splits)
    }
}

/// Row indices per class, in ascending class order
fn class_indices(labels: &Array1<f64>) -> BTreeMap<i64, Vec<usize>> {
    let mut classes: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, &val) in labels.iter().enumerate() {
        classes.entry(val.round() as i64).or_default().push(idx);
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_pos: usize, n_neg: usize) -> Array1<f64> {
        let mut v = vec![1.0; n_pos];
        v.extend(vec![0.0; n_neg]);
        Array1::from_vec(v)
    }

    #[test]
    fn test_split_covers_and_stratifies() {
        let y = labels(96, 203);
        let split = StratifiedSplitter::default().split(&y).unwrap();

        assert_eq!(split.train.len() + split.test.len(), 299);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..299).collect::<Vec<_>>());

        let train_pos = split.train.iter().filter(|&&i| y[i] > 0.5).count();
        assert_eq!(train_pos, 72);
    }

    #[test]
    fn test_split_is_deterministic() {
        let y = labels(30, 70);
        let a = StratifiedSplitter::default().with_seed(7).split(&y).unwrap();
        let b = StratifiedSplitter::default().with_seed(7).split(&y).unwrap();
        let c = StratifiedSplitter::default().with_seed(8).split(&y).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_fraction() {
        let y = labels(5, 5);
        for fraction in [0.0, 1.0, -0.2, 1.5] {
            let result = StratifiedSplitter::default().with_train_fraction(fraction).split(&y);
            assert!(matches!(result, Err(ClinicalError::ConfigurationError(_))));
        }
    }

    #[test]
    fn test_single_class_rejected() {
        let y = labels(10, 0);
        assert!(StratifiedSplitter::default().split(&y).is_err());
    }

    #[test]
    fn test_folds_partition() {
        let y = labels(24, 51);
        let folds = StratifiedSplitter::default().with_n_folds(5).folds(&y).unwrap();
        assert_eq!(folds.len(), 5);

        let mut assessed: Vec<usize> = folds.iter().flat_map(|f| f.assessment.clone()).collect();
        assessed.sort_unstable();
        assert_eq!(assessed, (0..75).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.analysis.len() + fold.assessment.len(), 75);
            assert_eq!(fold.assessment.len(), 15);
            let pos = fold.assessment.iter().filter(|&&i| y[i] > 0.5).count();
            assert!((4..=5).contains(&pos));
        }
    }

    #[test]
    fn test_too_many_folds() {
        let y = labels(3, 40);
        let result = StratifiedSplitter::default().with_n_folds(4).folds(&y);
        assert!(matches!(result, Err(ClinicalError::ConfigurationError(_))));
        let result = StratifiedSplitter::default().with_n_folds(1).folds(&y);
        assert!(matches!(result, Err(ClinicalError::ConfigurationError(_))));
    }
}
