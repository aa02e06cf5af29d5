//! CART trees shared by the boosting and forest models.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::seq::index::sample;

/// Gain below this does not justify a split.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Criterion {
    /// Weighted Gini impurity over 0/1 targets.
    Gini,
    /// Weighted squared error.
    SquaredError,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Features drawn per split; `None` uses every feature.
    pub max_features: Option<usize>,
    pub criterion: Criterion,
}

#[derive(Debug, Clone, Copy, Default)]
struct Stats {
    w: f64,
    wy: f64,
    wyy: f64,
}

impl Stats {
    fn add(&mut self, w: f64, y: f64) {
        self.w += w;
        self.wy += w * y;
        self.wyy += w * y * y;
    }

    fn minus(&self, other: &Stats) -> Stats {
        Stats {
            w: self.w - other.w,
            wy: self.wy - other.wy,
            wyy: self.wyy - other.wyy,
        }
    }

    /// Impurity times node weight.
    fn weighted_impurity(&self, criterion: Criterion) -> f64 {
        if self.w <= 0.0 {
            return 0.0;
        }
        match criterion {
            Criterion::Gini => {
                let p = self.wy / self.w;
                2.0 * p * (1.0 - p) * self.w
            }
            Criterion::SquaredError => (self.wyy - self.wy * self.wy / self.w).max(0.0),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    /// Total impurity decrease per feature.
    importances: Vec<f64>,
}

struct Builder<'a> {
    x: &'a DMatrix<f64>,
    y: &'a [f64],
    w: &'a [f64],
    params: TreeParams,
    leaf_value: &'a dyn Fn(&[usize]) -> f64,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
    /// Number of rows going left once sorted by `feature`.
    n_left: usize,
}

impl Tree {
    /// Grow a tree over the rows in `rows`.
    ///
    /// `leaf_value` maps the rows of a leaf to its output.
    pub(crate) fn fit(
        x: &DMatrix<f64>,
        y: &[f64],
        w: &[f64],
        rows: Vec<usize>,
        params: TreeParams,
        leaf_value: &dyn Fn(&[usize]) -> f64,
        rng: &mut StdRng,
    ) -> Tree {
        let mut builder = Builder {
            x,
            y,
            w,
            params,
            leaf_value,
            nodes: Vec::new(),
            importances: vec![0.0; x.ncols()],
        };
        let mut rows = rows;
        builder.grow(&mut rows, 0, rng);
        Tree {
            nodes: builder.nodes,
            importances: builder.importances,
        }
    }

    pub(crate) fn predict_row(&self, x: &DMatrix<f64>, row: usize) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[(row, *feature)] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub(crate) fn importances(&self) -> &[f64] {
        &self.importances
    }

    /// Importances scaled to sum to one; all zeros for a single-leaf tree.
    pub(crate) fn normalized_importances(&self) -> Vec<f64> {
        let total: f64 = self.importances.iter().sum();
        if total > 0.0 {
            self.importances.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.importances.len()]
        }
    }

    #[cfg(test)]
    pub(crate) fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

impl Builder<'_> {
    fn stats(&self, rows: &[usize]) -> Stats {
        let mut s = Stats::default();
        for &r in rows {
            s.add(self.w[r], self.y[r]);
        }
        s
    }

    fn push_leaf(&mut self, rows: &[usize]) -> usize {
        let value = (self.leaf_value)(rows);
        self.nodes.push(Node::Leaf { value });
        self.nodes.len() - 1
    }

    fn grow(&mut self, rows: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let parent = self.stats(rows);
        let impurity = parent.weighted_impurity(self.params.criterion);
        let min_leaf = self.params.min_samples_leaf.max(1);

        if depth >= self.params.max_depth || rows.len() < 2 * min_leaf || impurity <= MIN_GAIN {
            return self.push_leaf(rows);
        }

        let Some(best) = self.best_split(rows, &parent, impurity, rng) else {
            return self.push_leaf(rows);
        };

        let feature = best.feature;
        rows.sort_by(|a, b| self.x[(*a, feature)].total_cmp(&self.x[(*b, feature)]));
        self.importances[feature] += best.gain;

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: 0.0 });
        let (left_rows, right_rows) = rows.split_at_mut(best.n_left);
        let left = self.grow(left_rows, depth + 1, rng);
        let right = self.grow(right_rows, depth + 1, rng);
        self.nodes[idx] = Node::Split {
            feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    fn candidate_features(&self, rng: &mut StdRng) -> Vec<usize> {
        let p = self.x.ncols();
        match self.params.max_features {
            Some(k) if k < p => {
                let mut f = sample(rng, p, k.max(1)).into_vec();
                f.sort_unstable();
                f
            }
            _ => (0..p).collect(),
        }
    }

    fn best_split(
        &self,
        rows: &[usize],
        parent: &Stats,
        impurity: f64,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;
        let mut order: Vec<usize> = rows.to_vec();

        for feature in self.candidate_features(rng) {
            order.sort_by(|a, b| self.x[(*a, feature)].total_cmp(&self.x[(*b, feature)]));
            let mut left = Stats::default();
            for pos in 0..order.len() - 1 {
                let r = order[pos];
                left.add(self.w[r], self.y[r]);
                let n_left = pos + 1;
                if n_left < min_leaf || order.len() - n_left < min_leaf {
                    continue;
                }
                let here = self.x[(r, feature)];
                let next = self.x[(order[pos + 1], feature)];
                if next <= here {
                    continue;
                }
                let right = parent.minus(&left);
                let children = left.weighted_impurity(self.params.criterion)
                    + right.weighted_impurity(self.params.criterion);
                let gain = impurity - children;
                if gain > MIN_GAIN && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: here + (next - here) / 2.0,
                        gain,
                        n_left,
                    });
                }
            }
        }
        best
    }
}
