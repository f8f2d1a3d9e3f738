//! Hyperparameter grids

use super::model::ModelSpec;
use crate::error::{ClinicalError, Result};
use serde::{Deserialize, Serialize};

/// Penalty × mixture grid for elastic-net logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticGrid {
    pub penalties: Vec<f64>,
    pub mixtures: Vec<f64>,
}

impl Default for LogisticGrid {
    fn default() -> Self {
        Self::regular(5, 3)
    }
}

impl LogisticGrid {
    /// `n_penalty` penalties evenly spaced on log10 between 1e-4 and 1, and
    /// `n_mixture` mixtures evenly spaced on [0, 1]
    pub fn regular(n_penalty: usize, n_mixture: usize) -> Self {
        Self {
            penalties: log_space(-4.0, 0.0, n_penalty),
            mixtures: lin_space(0.0, 1.0, n_mixture),
        }
    }

    pub fn new(penalties: Vec<f64>, mixtures: Vec<f64>) -> Self {
        Self { penalties, mixtures }
    }
}

/// mtry × min_node_size grid with a fixed tree count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestGrid {
    pub mtry: Vec<usize>,
    pub min_node_size: Vec<usize>,
    pub tree_count: usize,
}

impl Default for ForestGrid {
    fn default() -> Self {
        Self {
            mtry: vec![2, 4, 7],
            min_node_size: vec![2, 10, 25],
            tree_count: 500,
        }
    }
}

impl ForestGrid {
    pub fn new(mtry: Vec<usize>, min_node_size: Vec<usize>, tree_count: usize) -> Self {
        Self {
            mtry,
            min_node_size,
            tree_count,
        }
    }

    pub fn with_tree_count(mut self, tree_count: usize) -> Self {
        self.tree_count = tree_count;
        self
    }
}

/// A grid for one model family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HyperparameterGrid {
    LogisticRegression(LogisticGrid),
    RandomForest(ForestGrid),
}

impl HyperparameterGrid {
    /// Every combination in a fixed order: the first parameter varies slowest,
    /// each in ascending order of its listed values.
    pub fn enumerate(&self) -> Vec<ModelSpec> {
        match self {
            HyperparameterGrid::LogisticRegression(grid) => grid
                .penalties
                .iter()
                .flat_map(|&penalty| {
                    grid.mixtures
                        .iter()
                        .map(move |&mixture| ModelSpec::LogisticRegression { penalty, mixture })
                })
                .collect(),
            HyperparameterGrid::RandomForest(grid) => grid
                .mtry
                .iter()
                .flat_map(|&mtry| {
                    grid.min_node_size.iter().map(move |&min_node_size| ModelSpec::RandomForest {
                        mtry,
                        min_node_size,
                        tree_count: grid.tree_count,
                    })
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            HyperparameterGrid::LogisticRegression(g) => g.penalties.len() * g.mixtures.len(),
            HyperparameterGrid::RandomForest(g) => g.mtry.len() * g.min_node_size.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn family(&self) -> &'static str {
        match self {
            HyperparameterGrid::LogisticRegression(_) => "logistic_regression",
            HyperparameterGrid::RandomForest(_) => "random_forest",
        }
    }

    /// Reject empty grids and out-of-range values
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ClinicalError::ConfigurationError(format!(
                "{} grid is empty",
                self.family()
            )));
        }
        match self {
            HyperparameterGrid::LogisticRegression(g) => {
                if let Some(p) = g.penalties.iter().find(|p| !(**p >= 0.0 && p.is_finite())) {
                    return Err(ClinicalError::ConfigurationError(format!("invalid penalty {}", p)));
                }
                if let Some(m) = g.mixtures.iter().find(|m| !(0.0..=1.0).contains(*m)) {
                    return Err(ClinicalError::ConfigurationError(format!(
                        "mixture must be in [0, 1], got {}",
                        m
                    )));
                }
            }
            HyperparameterGrid::RandomForest(g) => {
                if g.tree_count == 0 || g.mtry.contains(&0) || g.min_node_size.contains(&0) {
                    return Err(ClinicalError::ConfigurationError(
                        "forest tree_count, mtry and min_node_size must be positive".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn lin_space(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

fn log_space(start_exp: f64, end_exp: f64, n: usize) -> Vec<f64> {
    lin_space(start_exp, end_exp, n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect()
}
