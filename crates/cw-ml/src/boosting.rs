//! Gradient-boosted regression trees under log-loss.

use crate::classifier::Classifier;
use crate::tree::{Criterion, Tree, TreeParams};
use crate::{MlError, MlResult, check_training_set, sigmoid};
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone)]
pub struct GradientBoosting {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub seed: u64,
    init: f64,
    trees: Vec<Tree>,
}

impl GradientBoosting {
    pub fn new(seed: u64) -> Self {
        Self {
            n_estimators: 220,
            learning_rate: 0.1,
            max_depth: 3,
            seed,
            init: 0.0,
            trees: Vec::new(),
        }
    }

    fn raw_score(&self, x: &DMatrix<f64>, row: usize) -> f64 {
        self.init
            + self
                .trees
                .iter()
                .map(|t| self.learning_rate * t.predict_row(x, row))
                .sum::<f64>()
    }
}

impl Classifier for GradientBoosting {
    fn name(&self) -> &'static str {
        "GradientBoosting"
    }

    fn fit(&mut self, x: &DMatrix<f64>, y: &[u8]) -> MlResult<()> {
        check_training_set(x, y)?;
        let n = x.nrows();
        let yf: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();

        // Prior log-odds.
        let prior = yf.iter().sum::<f64>() / n as f64;
        self.init = (prior / (1.0 - prior)).ln();
        self.trees.clear();

        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::SquaredError,
        };
        let weights = vec![1.0; n];
        let mut raw = vec![self.init; n];
        let mut rng = StdRng::seed_from_u64(self.seed);

        for _ in 0..self.n_estimators {
            let probs: Vec<f64> = raw.iter().map(|&z| sigmoid(z)).collect();
            let residual: Vec<f64> = yf.iter().zip(&probs).map(|(y, p)| y - p).collect();
            let hessian: Vec<f64> = probs.iter().map(|p| p * (1.0 - p)).collect();

            // One Newton step per leaf.
            let leaf = |rows: &[usize]| {
                let num: f64 = rows.iter().map(|&r| residual[r]).sum();
                let den: f64 = rows.iter().map(|&r| hessian[r]).sum();
                if den.abs() < 1e-150 { 0.0 } else { num / den }
            };
            let tree = Tree::fit(x, &residual, &weights, (0..n).collect(), params, &leaf, &mut rng);

            for (row, z) in raw.iter_mut().enumerate() {
                *z += self.learning_rate * tree.predict_row(x, row);
            }
            self.trees.push(tree);
        }
        Ok(())
    }

    fn predict_proba(&self, x: &DMatrix<f64>) -> MlResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(MlError::NotFitted {
                model: "GradientBoosting",
            });
        }
        Ok((0..x.nrows()).map(|r| sigmoid(self.raw_score(x, r))).collect())
    }

    /// Mean of per-tree normalised impurity decreases.
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
