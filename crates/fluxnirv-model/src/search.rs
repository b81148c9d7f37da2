use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::forest::{ForestConfig, RandomForest};
use crate::metrics;

/// Hyperparameter grid: every depth is crossed with every ensemble size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub max_depths: Vec<usize>,
    pub tree_counts: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            max_depths: vec![3, 4, 5, 6],
            tree_counts: vec![10, 50, 100, 1000],
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    pub best: ForestConfig,
    /// Mean negative MSE of the winning cell across the validation folds.
    pub best_score: f64,
    pub evaluated: usize,
}

/// Exhaustive grid search scored by k-fold cross-validated negative mean
/// squared error, mirroring the usual model-selection loop. Ties keep the
/// earlier cell.
pub fn grid_search(train: &Dataset, grid: &ParamGrid, folds: usize, seed: u64) -> GridSearchOutcome {
    let mut best = ForestConfig {
        seed,
        ..ForestConfig::default()
    };
    let mut best_score = f64::NEG_INFINITY;
    let mut evaluated = 0;

    for &max_depth in &grid.max_depths {
        for &n_trees in &grid.tree_counts {
            let config = ForestConfig {
                n_trees,
                max_depth,
                seed,
                ..ForestConfig::default()
            };
            let scores = cross_validate(train, &config, folds, |actual, predicted| {
                -metrics::mse(actual, predicted)
            });
            let score = mean(&scores);
            evaluated += 1;
            debug!(max_depth, n_trees, score, "evaluated grid cell");

            if score > best_score {
                best_score = score;
                best = config;
            }
        }
    }

    GridSearchOutcome {
        best,
        best_score,
        evaluated,
    }
}

/// Fits one forest per fold and scores it on the held-out part.
pub fn cross_validate<F>(train: &Dataset, config: &ForestConfig, folds: usize, metric: F) -> Vec<f64>
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    train
        .kfold_indices(folds)
        .iter()
        .map(|(training, validation)| {
            let mut forest = RandomForest::new(config.clone());
            forest.fit(&train.subset(training));

            let held_out = train.subset(validation);
            let predicted = forest.predict(&held_out);
            metric(&held_out.labels, &predicted)
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
