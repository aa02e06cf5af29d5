//! Bagged Gini trees with per-bootstrap balanced class weights.

use crate::classifier::Classifier;
use crate::tree::{Criterion, Tree, TreeParams};
use crate::{MlError, MlResult, balanced_weights, check_training_set};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct RandomForest {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    trees: Vec<Tree>,
}

impl RandomForest {
    pub fn new(seed: u64) -> Self {
        Self {
            n_estimators: 500,
            max_depth: 10,
            min_samples_leaf: 8,
            seed,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Grow tree `index`; all randomness comes from `seed + index`.
fn grow_tree(x: &DMatrix<f64>, y: &[u8], yf: &[f64], params: TreeParams, seed: u64) -> Tree {
    let n = x.nrows();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut counts = vec![0.0; n];
    for _ in 0..n {
        counts[rng.gen_range(0..n)] += 1.0;
    }
    let weights = balanced_weights(y, &counts);
    let rows: Vec<usize> = (0..n).filter(|&i| counts[i] > 0.0).collect();

    let leaf = |rows: &[usize]| {
        let w: f64 = rows.iter().map(|&r| weights[r]).sum();
        let wy: f64 = rows.iter().map(|&r| weights[r] * yf[r]).sum();
        if w > 0.0 { wy / w } else { 0.0 }
    };
    Tree::fit(x, yf, &weights, rows, params, &leaf, &mut rng)
}

impl Classifier for RandomForest {
    fn name(&self) -> &'static str {
        "RandomForest"
    }

    fn fit(&mut self, x: &DMatrix<f64>, y: &[u8]) -> MlResult<()> {
        check_training_set(x, y)?;
        let yf: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();
        let max_features = ((x.ncols() as f64).sqrt().floor() as usize).max(1);
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            max_features: Some(max_features),
            criterion: Criterion::Gini,
        };

        let seed = self.seed;
        // Order of the collected trees follows the index, not the worker.
        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|i| grow_tree(x, y, &yf, params, seed.wrapping_add(i as u64)))
            .collect();
        tracing::debug!(trees = self.trees.len(), max_features, "random forest fitted");
        Ok(())
    }

    fn predict_proba(&self, x: &DMatrix<f64>) -> MlResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(MlError::NotFitted {
                model: "RandomForest",
            });
        }
        let n_trees = self.trees.len() as f64;
        Ok((0..x.nrows())
            .map(|r| self.trees.iter().map(|t| t.predict_row(x, r)).sum::<f64>() / n_trees)
            .collect())
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        let first = self.trees.first()?;
        let mut total = vec![0.0; first.importances().len()];
        for tree in &self.trees {
            for (acc, v) in total.iter_mut().zip(tree.normalized_importances()) {
                *acc += v;
            }
        }
        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            total.iter_mut().for_each(|v| *v /= sum);
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (DMatrix<f64>, Vec<u8>) {
        let x = DMatrix::from_fn(120, 4, |i, j| match j {
            0 => i as f64,
            1 => ((i * 13) % 7) as f64,
            2 => ((i * 5) % 11) as f64,
            _ => ((i * 3) % 4) as f64,
        });
        let y = (0..120).map(|i| u8::from(i >= 90)).collect();
        (x, y)
    }

    #[test]
    fn same_seed_same_forest() {
        let (x, y) = data();
        let mut a = RandomForest::new(7);
        a.n_estimators = 40;
        let mut b = a.clone();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
        assert_eq!(a.n_trees(), 40);
    }

    #[test]
    fn ranks_positive_region_higher() {
        let (x, y) = data();
        let mut rf = RandomForest::new(42);
        rf.n_estimators = 60;
        rf.fit(&x, &y).unwrap();
        let p = rf.predict_proba(&x).unwrap();
        assert!(p[119] > p[0]);
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
        let imp = rf.feature_importances().unwrap();
        assert!(imp[0] > imp[3]);
    }
}
