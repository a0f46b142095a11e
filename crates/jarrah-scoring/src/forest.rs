//! Bagged regression-tree ensemble.
//!
//! Each tree fits a bootstrap resample of the training rows with greedy
//! variance-reduction splits; the ensemble prediction is the mean over
//! trees. Feature importances are the impurity (sum-of-squared-error)
//! reductions attributed to each feature, normalized per tree and averaged
//! across the ensemble. All randomness flows from one seeded generator, so
//! a given (data, config) pair always trains the same forest.

use crate::error::ScoringError;
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Ensemble hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees (default: 100).
    pub n_estimators: usize,
    /// Maximum tree depth (default: 10).
    pub max_depth: usize,
    /// Minimum rows a node needs to be split (default: 5).
    pub min_samples_split: usize,
    /// Minimum rows each child must keep (default: 2).
    pub min_samples_leaf: usize,
    /// Seed for bootstrap resampling (default: 42).
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
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
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone)]
struct RegressionTree {
    root: Node,
}

/// Best split found for one node.
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    fn fit(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        samples: &[usize],
        config: &ForestConfig,
        importance: &mut Array1<f64>,
    ) -> Self {
        Self {
            root: Self::grow(x, y, samples, 0, config, importance),
        }
    }

    fn grow(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        samples: &[usize],
        depth: usize,
        config: &ForestConfig,
        importance: &mut Array1<f64>,
    ) -> Node {
        let mean = samples.iter().map(|&i| y[i]).sum::<f64>() / samples.len() as f64;
        if depth >= config.max_depth || samples.len() < config.min_samples_split {
            return Node::Leaf { value: mean };
        }

        let Some(split) = Self::best_split(x, y, samples, config) else {
            return Node::Leaf { value: mean };
        };

        importance[split.feature] += split.gain;

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .copied()
            .partition(|&i| x[[i, split.feature]] <= split.threshold);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(Self::grow(x, y, &left, depth + 1, config, importance)),
            right: Box::new(Self::grow(x, y, &right, depth + 1, config, importance)),
        }
    }

    /// Greedy exhaustive search: for every feature, sort the node's rows by
    /// value and evaluate every boundary between distinct values with prefix
    /// sums, maximizing the sum-of-squared-error reduction.
    fn best_split(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        samples: &[usize],
        config: &ForestConfig,
    ) -> Option<SplitCandidate> {
        let n = samples.len();
        let total_sum: f64 = samples.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = samples.iter().map(|&i| y[i] * y[i]).sum();
        let node_sse = total_sq - total_sum * total_sum / n as f64;

        let mut best: Option<SplitCandidate> = None;
        let mut sorted: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in 0..x.ncols() {
            sorted.clear();
            sorted.extend(samples.iter().map(|&i| (x[[i, feature]], y[i])));
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for i in 1..n {
                left_sum += sorted[i - 1].1;
                left_sq += sorted[i - 1].1 * sorted[i - 1].1;

                if sorted[i].0 <= sorted[i - 1].0 {
                    continue;
                }
                if i < config.min_samples_leaf || n - i < config.min_samples_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / i as f64;
                let right_sse = right_sq - right_sum * right_sum / (n - i) as f64;
                let gain = node_sse - left_sse - right_sse;

                if gain > 1e-12 && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (sorted[i - 1].0 + sorted[i].0) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// A trained bagged regression-tree ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    importances: Array1<f64>,
    n_features: usize,
}

impl RandomForest {
    /// Train on a (rows × features) matrix and one label per row.
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        config: &ForestConfig,
    ) -> Result<Self, ScoringError> {
        let n = x.nrows();
        if n == 0 {
            return Err(ScoringError::InsufficientTraining { rows: 0, needed: 1 });
        }
        if y.len() != n {
            return Err(ScoringError::Shape(format!(
                "{} rows but {} labels",
                n,
                y.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut trees = Vec::with_capacity(config.n_estimators);
        let mut importances = Array1::<f64>::zeros(x.ncols());

        for _ in 0..config.n_estimators {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut tree_importance = Array1::<f64>::zeros(x.ncols());
            trees.push(RegressionTree::fit(
                x,
                y,
                &bootstrap,
                config,
                &mut tree_importance,
            ));

            let total = tree_importance.sum();
            if total > 0.0 {
                importances += &(&tree_importance / total);
            }
        }
        importances /= config.n_estimators as f64;

        Ok(Self {
            trees,
            importances,
            n_features: x.ncols(),
        })
    }

    /// Feature width the forest was trained on.
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// Normalized impurity-reduction importances, one per feature.
    pub fn feature_importances(&self) -> ArrayView1<'_, f64> {
        self.importances.view()
    }

    /// Predict one row.
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<f64, ScoringError> {
        if row.len() != self.n_features {
            return Err(ScoringError::FeatureDimension {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    /// Predict every row of a matrix.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ScoringError> {
        let mut out = Array1::<f64>::zeros(x.nrows());
        for (i, row) in x.rows().into_iter().enumerate() {
            out[i] = self.predict_row(row)?;
        }
        Ok(out)
    }
}
