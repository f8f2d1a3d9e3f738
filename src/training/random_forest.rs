//! Random forest classifier

use super::decision_tree::DecisionTree;
use crate::error::{ClinicalError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged Gini trees; the class-1 probability is the mean of the trees' leaf
/// proportions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_trees: usize,
    /// Predictors sampled at each split (clamped to the feature count)
    pub mtry: usize,
    /// Nodes with fewer rows than this are not split
    pub min_node_size: usize,
    /// Base seed; tree `i` uses `seed + i`
    pub seed: u64,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(500, 3, 5)
    }
}

impl RandomForest {
    pub fn new(n_trees: usize, mtry: usize, min_node_size: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_trees,
            mtry,
            min_node_size,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Grow every tree on its own bootstrap sample, in parallel
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(ClinicalError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 || self.n_trees == 0 {
            return Err(ClinicalError::TrainingError(
                "random forest needs at least one row and one tree".to_string(),
            ));
        }

        let mtry = self.mtry.clamp(1, x.ncols().max(1));
        let base_seed = self.seed;
        let min_node_size = self.min_node_size;

        let trees: Result<Vec<DecisionTree>> = (0..self.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));
                let sample_indices: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot = y.select(Axis(0), &sample_indices);

                let mut tree = DecisionTree::new()
                    .with_min_node_size(min_node_size)
                    .with_max_features(mtry);
                tree.fit_with_rng(&x_boot, &y_boot, &mut rng)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        Ok(self)
    }

    /// Mean class-1 probability across trees. Summed in tree order so the
    /// result does not depend on the thread count.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ClinicalError::ModelNotFitted);
        }
        let per_tree: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict_proba(x))
            .collect::<Result<_>>()?;

        let mut total = Array1::<f64>::zeros(x.nrows());
        for p in &per_tree {
            total += p;
        }
        Ok(total / self.trees.len() as f64)
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| if j == 0 { i as f64 } else { (i % 7) as f64 });
        let y = Array1::from_shape_fn(40, |i| if i >= 20 { 1.0 } else { 0.0 });
        (x, y)
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = separable();
        let mut forest = RandomForest::new(25, 1, 2).with_seed(3);
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.trees().len(), 25);

        let p = forest.predict_proba(&array![[2.0, 0.0], [37.0, 0.0]]).unwrap();
        assert!(p[0] < 0.5);
        assert!(p[1] > 0.5);
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = separable();
        let mut a = RandomForest::new(10, 1, 2).with_seed(11);
        let mut b = RandomForest::new(10, 1, 2).with_seed(11);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_not_fitted() {
        let forest = RandomForest::default();
        assert!(matches!(forest.predict_proba(&array![[1.0]]), Err(ClinicalError::ModelNotFitted)));
    }
}
