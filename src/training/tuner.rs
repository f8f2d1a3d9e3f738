//! Grid search with k-fold cross-validation scored by ROC AUC

use super::grid::HyperparameterGrid;
use super::metrics::{roc_auc, roc_curve, RocPoint};
use super::model::{FittedModel, ModelSpec};
use super::splitter::CVSplit;
use crate::data::Dataset;
use crate::error::{ClinicalError, Result};
use crate::preprocessing::RecipeConfig;
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of fitting one candidate on one fold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    pub candidate_idx: usize,
    pub fold_idx: usize,
    pub spec: ModelSpec,
    /// NaN when the trial failed
    pub roc_auc: f64,
    pub error: Option<String>,
    /// Held-out class-1 probabilities, in assessment-row order
    pub probabilities: Vec<f64>,
    pub labels: Vec<f64>,
}

impl TrialResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.roc_auc.is_finite()
    }

    pub fn roc_curve(&self) -> Vec<RocPoint> {
        roc_curve(
            &Array1::from_vec(self.labels.clone()),
            &Array1::from_vec(self.probabilities.clone()),
        )
    }
}

/// Cross-validated score of one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub candidate_idx: usize,
    pub spec: ModelSpec,
    /// Mean over successful folds; NaN if none succeeded
    pub mean_roc_auc: f64,
    pub std_roc_auc: f64,
    pub n_successful: usize,
    pub n_failed: usize,
}

impl CandidateSummary {
    fn from_trials(candidate_idx: usize, spec: ModelSpec, trials: &[&TrialResult]) -> Self {
        let scores: Vec<f64> = trials.iter().filter(|t| t.is_success()).map(|t| t.roc_auc).collect();
        let n = scores.len();
        let (mean, std) = if n == 0 {
            (f64::NAN, f64::NAN)
        } else {
            let mean = scores.iter().sum::<f64>() / n as f64;
            let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;
            (mean, var.sqrt())
        };

        Self {
            candidate_idx,
            spec,
            mean_roc_auc: mean,
            std_roc_auc: std,
            n_successful: n,
            n_failed: trials.len() - n,
        }
    }
}

/// Everything the grid search produced for one model family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuneResult {
    pub family: String,
    pub best_idx: usize,
    pub best_spec: ModelSpec,
    pub summaries: Vec<CandidateSummary>,
    pub trials: Vec<TrialResult>,
}

impl TuneResult {
    pub fn best_summary(&self) -> &CandidateSummary {
        &self.summaries[self.best_idx]
    }

    /// Per-fold ROC curves of the selected candidate
    pub fn best_roc_curves(&self) -> Vec<(usize, Vec<RocPoint>)> {
        self.trials
            .iter()
            .filter(|t| t.candidate_idx == self.best_idx && t.is_success())
            .map(|t| (t.fold_idx, t.roc_curve()))
            .collect()
    }

    pub fn n_failed_trials(&self) -> usize {
        self.trials.iter().filter(|t| !t.is_success()).count()
    }
}

/// Grid search over one model family
#[derive(Debug, Clone)]
pub struct ModelTuner {
    recipe: RecipeConfig,
    grid: HyperparameterGrid,
    seed: u64,
    n_jobs: Option<usize>,
}

impl ModelTuner {
    pub fn new(recipe: RecipeConfig, grid: HyperparameterGrid) -> Self {
        Self {
            recipe,
            grid,
            seed: 42,
            n_jobs: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Evaluate trials on a dedicated pool of `n_jobs` threads
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    pub fn grid(&self) -> &HyperparameterGrid {
        &self.grid
    }

    /// Score every (candidate, fold) pair, select the highest mean ROC AUC
    /// (first enumerated wins ties) and refit it on all of `train`.
    pub fn tune(&self, train: &Dataset, folds: &[CVSplit]) -> Result<(TuneResult, FittedModel)> {
        self.grid.validate()?;
        self.recipe.validate()?;
        if folds.is_empty() {
            return Err(ClinicalError::ConfigurationError("no resampling folds".to_string()));
        }

        let start = Instant::now();
        let candidates = self.grid.enumerate();
        let pairs: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        info!(
            family = self.grid.family(),
            candidates = candidates.len(),
            folds = folds.len(),
            trials = pairs.len(),
            "Starting grid search"
        );

        let run_all = || -> Result<Vec<TrialResult>> {
            pairs
                .par_iter()
                .map(|&(c, f)| self.run_trial(c, candidates[c], &folds[f], train))
                .collect()
        };
        let trials = match self.n_jobs {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ClinicalError::ConfigurationError(format!("thread pool error: {}", e)))?
                .install(run_all)?,
            None => run_all()?,
        };

        let summaries: Vec<CandidateSummary> = candidates
            .iter()
            .enumerate()
            .map(|(c, spec)| {
                let own: Vec<&TrialResult> = trials.iter().filter(|t| t.candidate_idx == c).collect();
                CandidateSummary::from_trials(c, *spec, &own)
            })
            .collect();

        let ranking = rank_candidates(&summaries);
        if ranking.is_empty() {
            return Err(ClinicalError::TrainingError(format!(
                "every {} candidate failed on every fold",
                self.grid.family()
            )));
        }
        let n_failed = trials.iter().filter(|t| !t.is_success()).count();

        // The top candidate is refitted on all of Train; a refit that does not
        // converge falls through to the next-ranked candidate.
        let mut refit_error = None;
        let mut selected = None;
        for &idx in &ranking {
            match FittedModel::fit(candidates[idx], &self.recipe, train, self.seed) {
                Ok(model) => {
                    selected = Some((idx, model));
                    break;
                }
                Err(e) if !e.is_fatal() => {
                    warn!(candidate = idx, spec = %candidates[idx], error = %e, "Refit failed, trying next candidate");
                    refit_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        let (best_idx, model) = selected.ok_or_else(|| {
            refit_error.unwrap_or_else(|| ClinicalError::TrainingError("no candidate could be refitted".to_string()))
        })?;
        let best_spec = candidates[best_idx];

        info!(
            family = self.grid.family(),
            best = %best_spec,
            mean_roc_auc = summaries[best_idx].mean_roc_auc,
            failed_trials = n_failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Grid search complete"
        );

        Ok((
            TuneResult {
                family: self.grid.family().to_string(),
                best_idx,
                best_spec,
                summaries,
                trials,
            },
            model,
        ))
    }

    /// Fit and score one (candidate, fold) pair. A convergence failure is
    /// recorded as a NaN trial; any other error aborts the search.
    fn run_trial(
        &self,
        candidate_idx: usize,
        spec: ModelSpec,
        fold: &CVSplit,
        train: &Dataset,
    ) -> Result<TrialResult> {
        let analysis = train.select(&fold.analysis);
        let assessment = train.select(&fold.assessment);
        let labels = assessment.labels().to_vec();
        let seed = trial_seed(self.seed, candidate_idx, fold.fold_idx);

        let outcome = FittedModel::fit(spec, &self.recipe, &analysis, seed).and_then(|model| {
            let probs = model.predict_proba(&assessment)?;
            let auc = roc_auc(assessment.labels(), &probs)?;
            Ok((probs.to_vec(), auc))
        });

        match outcome {
            Ok((probabilities, auc)) => {
                debug!(candidate = candidate_idx, fold = fold.fold_idx, roc_auc = auc, "Trial finished");
                Ok(TrialResult {
                    candidate_idx,
                    fold_idx: fold.fold_idx,
                    spec,
                    roc_auc: auc,
                    error: None,
                    probabilities,
                    labels,
                })
            }
            Err(e) if !e.is_fatal() => {
                debug!(candidate = candidate_idx, fold = fold.fold_idx, error = %e, "Trial did not converge");
                Ok(TrialResult {
                    candidate_idx,
                    fold_idx: fold.fold_idx,
                    spec,
                    roc_auc: f64::NAN,
                    error: Some(e.to_string()),
                    probabilities: Vec::new(),
                    labels,
                })
            }
            Err(e) => {
                warn!(candidate = candidate_idx, fold = fold.fold_idx, error = %e, "Trial failed");
                Err(e)
            }
        }
    }
}

/// Candidates with at least one scored fold, best first: candidates that
/// scored on every fold rank above those with failed folds, then by mean ROC
/// AUC descending; earlier candidates win ties.
fn rank_candidates(summaries: &[CandidateSummary]) -> Vec<usize> {
    let mut ranked: Vec<&CandidateSummary> = summaries
        .iter()
        .filter(|s| s.n_successful > 0 && s.mean_roc_auc.is_finite())
        .collect();
    ranked.sort_by(|a, b| {
        (a.n_failed > 0)
            .cmp(&(b.n_failed > 0))
            .then(b.mean_roc_auc.total_cmp(&a.mean_roc_auc))
            .then(a.candidate_idx.cmp(&b.candidate_idx))
    });
    ranked.into_iter().map(|s| s.candidate_idx).collect()
}

/// Independent random stream per (candidate, fold)
fn trial_seed(seed: u64, candidate_idx: usize, fold_idx: usize) -> u64 {
    seed.wrapping_add((candidate_idx as u64).wrapping_mul(0x9E37_79B9))
        .wrapping_add((fold_idx as u64 + 1).wrapping_mul(0x85EB_CA6B))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnSpec, Schema};
    use crate::training::grid::{ForestGrid, LogisticGrid};
    use crate::training::splitter::StratifiedSplitter;

    fn summary(idx: usize, mean: f64, ok: usize, failed: usize) -> CandidateSummary {
        CandidateSummary {
            candidate_idx: idx,
            spec: ModelSpec::LogisticRegression { penalty: 0.1, mixture: 0.0 },
            mean_roc_auc: mean,
            std_roc_auc: 0.0,
            n_successful: ok,
            n_failed: failed,
        }
    }

    #[test]
    fn test_ranking_prefers_first_on_tie() {
        let s = vec![summary(0, 0.8, 3, 0), summary(1, 0.9, 3, 0), summary(2, 0.9, 3, 0)];
        assert_eq!(rank_candidates(&s), vec![1, 2, 0]);
    }

    #[test]
    fn test_ranking_skips_and_demotes_failures() {
        let s = vec![summary(0, f64::NAN, 0, 3), summary(1, 0.95, 2, 1), summary(2, 0.6, 3, 0)];
        assert_eq!(rank_candidates(&s), vec![2, 1]);
        assert!(rank_candidates(&[summary(0, f64::NAN, 0, 3)]).is_empty());
    }

    fn train_set() -> Dataset {
        let schema = Schema::new(vec![ColumnSpec::numeric("signal"), ColumnSpec::numeric("noise")], "y").unwrap();
        let n = 60;
        let x = ndarray::Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                i as f64 + if i % 2 == 0 { 0.5 } else { 0.0 }
            } else {
                ((i * 37) % 11) as f64
            }
        });
        let y = Array1::from_shape_fn(n, |i| if i >= 30 { 1.0 } else { 0.0 });
        Dataset::new(schema, x, y).unwrap()
    }

    #[test]
    fn test_tune_logistic() {
        let train = train_set();
        let folds = StratifiedSplitter::default().with_n_folds(3).folds(train.labels()).unwrap();
        let tuner = ModelTuner::new(
            RecipeConfig::default(),
            HyperparameterGrid::LogisticRegression(LogisticGrid::new(vec![0.1, 1.0], vec![0.0, 1.0])),
        );
        let (result, model) = tuner.tune(&train, &folds).unwrap();

        assert_eq!(result.trials.len(), 12);
        assert_eq!(result.summaries.len(), 4);
        assert!(result.best_summary().mean_roc_auc > 0.9);
        assert_eq!(result.best_roc_curves().len(), 3);
        assert_eq!(model.spec(), &result.best_spec);
    }

    #[test]
    fn test_tune_is_deterministic_across_pools() {
        let train = train_set();
        let folds = StratifiedSplitter::default().with_n_folds(3).folds(train.labels()).unwrap();
        let grid = HyperparameterGrid::RandomForest(ForestGrid::new(vec![1, 2], vec![2], 20));
        let (a, _) = ModelTuner::new(RecipeConfig::default(), grid.clone())
            .with_n_jobs(1)
            .tune(&train, &folds)
            .unwrap();
        let (b, _) = ModelTuner::new(RecipeConfig::default(), grid)
            .with_n_jobs(4)
            .tune(&train, &folds)
            .unwrap();

        let scores = |r: &TuneResult| r.trials.iter().map(|t| t.roc_auc).collect::<Vec<_>>();
        assert_eq!(scores(&a), scores(&b));
        assert_eq!(a.best_idx, b.best_idx);
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let train = train_set();
        let folds = StratifiedSplitter::default().with_n_folds(3).folds(train.labels()).unwrap();
        let tuner = ModelTuner::new(
            RecipeConfig::default(),
            HyperparameterGrid::LogisticRegression(LogisticGrid::new(vec![f64::NAN], vec![0.0])),
        );
        assert!(matches!(tuner.tune(&train, &folds), Err(ClinicalError::ConfigurationError(_))));
    }

    #[test]
    fn test_non_converging_candidate_is_isolated() {
        let train = train_set();
        let folds = StratifiedSplitter::default().with_n_folds(3).folds(train.labels()).unwrap();
        // An unpenalized fit on separable rows never settles
        let tuner = ModelTuner::new(
            RecipeConfig::default(),
            HyperparameterGrid::LogisticRegression(LogisticGrid::new(vec![0.0, 0.1], vec![0.0])),
        );
        let (result, model) = tuner.tune(&train, &folds).unwrap();

        let first: Vec<&TrialResult> = result.trials.iter().filter(|t| t.candidate_idx == 0).collect();
        assert_eq!(first.len(), 3);
        for trial in first {
            assert!(trial.roc_auc.is_nan());
            assert!(trial.error.is_some());
        }
        assert_eq!(result.best_idx, 1);
        assert_eq!(result.summaries[0].n_successful, 0);
        assert_eq!(model.spec(), &result.best_spec);
    }

    #[test]
    fn test_bad_recipe_aborts_search() {
        let train = train_set();
        let folds = StratifiedSplitter::default().with_n_folds(3).folds(train.labels()).unwrap();
        let recipe = RecipeConfig { rare_threshold: 1.5, ..RecipeConfig::default() };
        let tuner = ModelTuner::new(
            recipe,
            HyperparameterGrid::LogisticRegression(LogisticGrid::new(vec![0.1], vec![0.0])),
        );
        assert!(matches!(tuner.tune(&train, &folds), Err(ClinicalError::ConfigurationError(_))));
    }

    #[test]
    fn test_unscorable_fold_aborts_search() {
        let train = train_set();
        let folds = StratifiedSplitter::default().with_n_folds(3).folds(train.labels()).unwrap();
        let tuner = ModelTuner::new(
            RecipeConfig::default(),
            HyperparameterGrid::LogisticRegression(LogisticGrid::new(vec![0.1], vec![0.0])),
        );
        let mut broken = folds.clone();
        broken[1].assessment.clear();
        let result = tuner.tune(&train, &broken);
        assert!(result.is_err());
        assert!(!matches!(result, Err(ClinicalError::TrainingError(_))));
    }
}
