use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    importance: f64,
}

/// CART-style regression tree minimizing within-node variance.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<TreeNode>,
    feature_importances: Vec<f64>,
}

impl RegressionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            feature_importances: Vec::new(),
        }
    }

    pub fn fit(&mut self, dataset: &Dataset) {
        self.feature_importances = vec![0.0; dataset.n_features()];

        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build_node(dataset, &indices, 0, &mut rng));

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for importance in &mut self.feature_importances {
                *importance /= total;
            }
        }
    }

    fn build_node(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let labels: Vec<f64> = indices.iter().map(|&i| dataset.labels[i]).collect();
        let impurity = variance(&labels);

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || impurity < 1e-10
        {
            return TreeNode::Leaf {
                value: mean(&labels),
            };
        }

        match self.find_best_split(dataset, indices, impurity, rng) {
            Some(candidate) => {
                if candidate.left.len() < self.config.min_samples_leaf
                    || candidate.right.len() < self.config.min_samples_leaf
                {
                    return TreeNode::Leaf {
                        value: mean(&labels),
                    };
                }

                self.feature_importances[candidate.feature_idx] += candidate.importance;

                let left = self.build_node(dataset, &candidate.left, depth + 1, rng);
                let right = self.build_node(dataset, &candidate.right, depth + 1, rng);
                TreeNode::Split {
                    feature_idx: candidate.feature_idx,
                    threshold: candidate.threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            None => TreeNode::Leaf {
                value: mean(&labels),
            },
        }
    }

    fn find_best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = dataset.n_features();
        let max_features = self.config.max_features.unwrap_or(n_features);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features.max(1));

        let mut best_gain = 0.0;
        let mut best: Option<SplitCandidate> = None;

        for &feature_idx in &feature_indices {
            let mut values: Vec<f64> = indices
                .iter()
                .map(|&i| dataset.features[i][feature_idx])
                .collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let (left, right): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| dataset.features[i][feature_idx] <= threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let left_labels: Vec<f64> = left.iter().map(|&i| dataset.labels[i]).collect();
                let right_labels: Vec<f64> = right.iter().map(|&i| dataset.labels[i]).collect();

                let n_left = left.len() as f64;
                let n_right = right.len() as f64;
                let weighted = (n_left * variance(&left_labels)
                    + n_right * variance(&right_labels))
                    / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        left,
                        right,
                        importance: gain * indices.len() as f64,
                    });
                }
            }
        }

        best
    }

    pub fn predict_one(&self, features: &[f64]) -> f64 {
        match &self.root {
            Some(node) => predict_node(node, features),
            None => 0.0,
        }
    }

    pub fn predict(&self, dataset: &Dataset) -> Vec<f64> {
        dataset
            .features
            .iter()
            .map(|features| self.predict_one(features))
            .collect()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

fn predict_node(node: &TreeNode, features: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value } => *value,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
        } => {
            if features[*feature_idx] <= *threshold {
                predict_node(left, features)
            } else {
                predict_node(right, features)
            }
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_dataset() -> Dataset {
        let mut dataset = Dataset::new(vec!["x".to_string()]);
        for i in 0..100 {
            let x = i as f64 / 10.0;
            let y = if x > 5.0 { 10.0 } else { 1.0 };
            dataset.add_sample(vec![x], y);
        }
        dataset
    }

    #[test]
    fn learns_a_step_function() {
        let mut tree = RegressionTree::new(TreeConfig::default());
        let dataset = step_dataset();
        tree.fit(&dataset);

        assert!((tree.predict_one(&[2.0]) - 1.0).abs() < 1e-6);
        assert!((tree.predict_one(&[8.0]) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn importances_are_normalized() {
        let mut tree = RegressionTree::new(TreeConfig::default());
        let dataset = step_dataset();
        tree.fit(&dataset);

        let total: f64 = tree.feature_importances().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unfitted_tree_predicts_zero() {
        let tree = RegressionTree::new(TreeConfig::default());
        assert_eq!(tree.predict_one(&[1.0]), 0.0);
    }
}
