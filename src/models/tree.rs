//! Decision-tree regressor (CART, squared-error criterion)

use crate::error::{EstimatorError, EstimatorResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum impurity decrease for a split to be worth making
const MIN_GAIN: f64 = 1e-12;

/// Tree growth parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Seeds the per-node feature permutation used to break ties
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Node {
    Leaf {
        value: f64,
        samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        samples: usize,
    },
}

/// Fitted regression tree. Rows with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    params: TreeParams,
    n_features: usize,
    nodes: Vec<Node>,
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: TreeParams,
    rng: StdRng,
    nodes: Vec<Node>,
    features: Vec<usize>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl DecisionTreeRegressor {
    /// Grow a tree on `x` (row-major) and targets `y`
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: TreeParams) -> EstimatorResult<Self> {
        if x.is_empty() {
            return Err(EstimatorError::Training("no training rows".to_string()));
        }
        if x.len() != y.len() {
            return Err(EstimatorError::Training(format!(
                "{} feature rows but {} targets",
                x.len(),
                y.len()
            )));
        }
        let n_features = x[0].len();
        if x.iter().any(|row| row.len() != n_features) {
            return Err(EstimatorError::Training("ragged feature rows".to_string()));
        }

        let mut builder = Builder {
            x,
            y,
            params,
            rng: StdRng::seed_from_u64(params.seed),
            nodes: Vec::new(),
            features: (0..n_features).collect(),
        };
        let indices: Vec<usize> = (0..x.len()).collect();
        builder.grow(indices, 0);

        let tree = Self {
            params,
            n_features,
            nodes: builder.nodes,
        };
        debug!(
            nodes = tree.node_count(),
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "Decision tree fitted"
        );
        Ok(tree)
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Longest root-to-leaf path, counted in edges
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match self.nodes.get(node) {
                Some(Node::Split { left, right, .. }) => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Some(Node::Leaf { .. }) => deepest = deepest.max(depth),
                None => {}
            }
        }
        deepest
    }

    /// Predict one row; the row must have `n_features` values
    pub fn predict_row(&self, row: &[f64]) -> EstimatorResult<f64> {
        if row.len() != self.n_features {
            return Err(EstimatorError::InvalidInput(format!(
                "model expects {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        let mut idx = 0;
        loop {
            let node = self.nodes.get(idx).ok_or_else(|| {
                EstimatorError::InvalidInput(format!("tree has no node {idx}"))
            })?;
            match node {
                Node::Leaf { value, .. } => return Ok(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> EstimatorResult<Vec<f64>> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

impl Builder<'_> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let samples = indices.len();
        let sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let mean = sum / samples as f64;

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: mean,
            samples,
        });

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        let too_small = samples < self.params.min_samples_split.max(2)
            || samples < 2 * self.params.min_samples_leaf.max(1);
        let pure = indices.iter().all(|&i| self.y[i] == self.y[indices[0]]);
        if depth_reached || too_small || pure {
            return node_id;
        }

        let Some(best) = self.best_split(&indices, sum) else {
            return node_id;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i][best.feature] <= best.threshold);

        let left = self.grow(left_idx, depth + 1);
        let right = self.grow(right_idx, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
            samples,
        };
        node_id
    }

    /// Best split by squared-error reduction. Maximizing
    /// `sum_l^2 / n_l + sum_r^2 / n_r` is equivalent to minimizing the summed
    /// squared error of the children.
    fn best_split(&mut self, indices: &[usize], total: f64) -> Option<BestSplit> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent_score = total * total / n as f64;

        self.features.shuffle(&mut self.rng);

        let mut best: Option<BestSplit> = None;
        let mut sorted = indices.to_vec();
        for &feature in &self.features {
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left_sum = 0.0;
            for pos in 0..n - 1 {
                left_sum += self.y[sorted[pos]];
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let here = self.x[sorted[pos]][feature];
                let next = self.x[sorted[pos + 1]][feature];
                if here >= next {
                    continue;
                }

                let right_sum = total - left_sum;
                let score =
                    left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
                let better = best.as_ref().map_or(true, |b| score > b.score + MIN_GAIN);
                if better {
                    let mut threshold = here + (next - here) / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        best.filter(|b| b.score > parent_score + MIN_GAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x = vec![
            vec![0.0, 1.0],
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
        ];
        let y = vec![0.1, 0.1, 0.9, 0.9, 0.1, 0.9];
        (x, y)
    }

    #[test]
    fn test_learns_step_function() {
        let (x, y) = step_data();
        let tree = DecisionTreeRegressor::fit(&x, &y, TreeParams::default()).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaf_count(), 2);
        assert!((tree.predict_row(&[0.0, 0.0]).unwrap() - 0.1).abs() < 1e-12);
        assert!((tree.predict_row(&[1.0, 1.0]).unwrap() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_fits_training_data_exactly_when_unbounded() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| ((i * 7) % 11) as f64 / 10.0).collect();
        let tree = DecisionTreeRegressor::fit(&x, &y, TreeParams::default()).unwrap();
        let predicted = tree.predict(&x).unwrap();
        for (p, t) in predicted.iter().zip(&y) {
            assert!((p - t).abs() < 1e-12);
        }
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..32).map(|i| i as f64).collect();
        let params = TreeParams {
            max_depth: Some(2),
            ..TreeParams::default()
        };
        let tree = DecisionTreeRegressor::fit(&x, &y, params).unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn test_same_seed_same_tree() {
        let (x, y) = step_data();
        let a = DecisionTreeRegressor::fit(&x, &y, TreeParams::default()).unwrap();
        let b = DecisionTreeRegressor::fit(&x, &y, TreeParams::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0]];
        let y = vec![0.5, 0.5, 0.5];
        let tree = DecisionTreeRegressor::fit(&x, &y, TreeParams::default()).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_row(&[10.0]).unwrap(), 0.5);
    }

    #[test]
    fn test_rejects_wrong_width() {
        let (x, y) = step_data();
        let tree = DecisionTreeRegressor::fit(&x, &y, TreeParams::default()).unwrap();
        assert!(tree.predict_row(&[1.0]).is_err());
        assert!(DecisionTreeRegressor::fit(&x, &y[..2], TreeParams::default()).is_err());
    }

    #[test]
    fn test_round_trips_through_json() {
        let (x, y) = step_data();
        let tree = DecisionTreeRegressor::fit(&x, &y, TreeParams::default()).unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        let restored: DecisionTreeRegressor = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, restored);
    }
}
