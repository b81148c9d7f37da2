use std::path::PathBuf;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::Dataset;
use crate::forest::RandomForest;
use crate::metrics;
use crate::search::{cross_validate, grid_search, ParamGrid};

/// Everything the trainer needs; the defaults reproduce the reference
/// experiment (TA, VPD_PI, PPFD_IN and the derived index predicting
/// GPP_PI_F, 80/20 split at seed 42).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub dataset_path: PathBuf,
    pub feature_columns: Vec<String>,
    pub target_column: String,
    /// Metadata lines before the dataset's column-name header.
    pub skip_rows: usize,
    pub test_ratio: f64,
    pub seed: u64,
    pub grid: ParamGrid,
    pub search_folds: usize,
    pub scoring_folds: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("dataset.csv"),
            feature_columns: ["TA", "VPD_PI", "PPFD_IN", "NIRV"]
                .map(String::from)
                .to_vec(),
            target_column: "GPP_PI_F".to_string(),
            skip_rows: 2,
            test_ratio: 0.2,
            seed: 42,
            grid: ParamGrid::default(),
            search_folds: 5,
            scoring_folds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub n_train: usize,
    pub n_test: usize,
    pub best_max_depth: usize,
    pub best_n_trees: usize,
    /// Mean absolute error on each scoring fold of the training set.
    pub cv_mae: Vec<f64>,
    pub test_rmse: f64,
    pub test_r2: f64,
    pub feature_importances: Vec<FeatureImportance>,
}

/// The report plus the raw held-out series, so callers can render the
/// predicted-vs-actual plot.
pub struct TrainOutcome {
    pub report: TrainReport,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
}

pub fn train_and_evaluate(config: &TrainerConfig) -> Result<TrainOutcome> {
    let dataset = Dataset::from_csv(
        &config.dataset_path,
        config.skip_rows,
        &config.feature_columns,
        &config.target_column,
    )?;
    let min_rows = config.search_folds.max(config.scoring_folds).max(2);
    ensure!(
        dataset.n_samples() >= min_rows,
        "dataset has {} usable rows but at least {min_rows} are needed",
        dataset.n_samples()
    );

    let split = dataset.random_split(config.test_ratio, config.seed);
    info!(
        n_train = split.train.n_samples(),
        n_test = split.test.n_samples(),
        "split dataset"
    );

    let search = grid_search(&split.train, &config.grid, config.search_folds, config.seed);
    info!(
        max_depth = search.best.max_depth,
        n_trees = search.best.n_trees,
        score = search.best_score,
        evaluated = search.evaluated,
        "grid search finished"
    );

    let cv_mae = cross_validate(
        &split.train,
        &search.best,
        config.scoring_folds,
        metrics::mae,
    );

    let mut forest = RandomForest::new(search.best.clone());
    forest.fit(&split.train);

    let predicted = forest.predict(&split.test);
    let test_rmse = metrics::rmse(&split.test.labels, &predicted);
    let test_r2 = metrics::r2_score(&split.test.labels, &predicted);
    info!(test_rmse, test_r2, "held-out evaluation finished");

    let feature_importances = forest
        .feature_importance_ranking()
        .into_iter()
        .map(|(feature, importance)| FeatureImportance {
            feature: feature.to_string(),
            importance,
        })
        .collect();

    Ok(TrainOutcome {
        report: TrainReport {
            n_train: split.train.n_samples(),
            n_test: split.test.n_samples(),
            best_max_depth: search.best.max_depth,
            best_n_trees: search.best.n_trees,
            cv_mae,
            test_rmse,
            test_r2,
            feature_importances,
        },
        actual: split.test.labels,
        predicted,
    })
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use super::*;

    fn write_dataset(dir: &std::path::Path, rows: usize) -> PathBuf {
        let path = dir.join("dataset.csv");
        let mut content = String::from(
            "# Site: US-Var\n# tower metadata\nTIMESTAMP_START,TIMESTAMP_END,TA,VPD_PI,PPFD_IN,NIRV,GPP_PI_F\n",
        );
        for i in 0..rows {
            let ta = 15.0 + (i % 20) as f64 * 0.5;
            let vpd = 0.5 + (i % 10) as f64 * 0.1;
            let ppfd = 800.0 + (i % 30) as f64 * 25.0;
            let nirv = 1.0 + (i % 12) as f64 * 0.3;
            let gpp = 0.8 * nirv + 0.002 * ppfd + 0.05 * ta - 0.3 * vpd;
            writeln!(
                content,
                "20150601{:02}00,20150601{:02}30,{ta},{vpd},{ppfd},{nirv},{gpp}",
                i % 24,
                i % 24
            )
            .expect("format row");
        }
        std::fs::write(&path, content).expect("write dataset fixture");
        path
    }

    #[test]
    fn trains_on_a_synthetic_dataset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dataset_path = write_dataset(dir.path(), 120);

        let config = TrainerConfig {
            dataset_path,
            grid: ParamGrid {
                max_depths: vec![4, 6],
                tree_counts: vec![10, 20],
            },
            search_folds: 3,
            scoring_folds: 4,
            ..TrainerConfig::default()
        };

        let outcome = train_and_evaluate(&config).expect("training failed");

        assert_eq!(outcome.report.n_train, 96);
        assert_eq!(outcome.report.n_test, 24);
        assert_eq!(outcome.report.cv_mae.len(), 4);
        assert_eq!(outcome.actual.len(), outcome.predicted.len());
        assert!(outcome.report.test_r2 > 0.5, "r2 = {}", outcome.report.test_r2);
        assert_eq!(outcome.report.feature_importances.len(), 4);
    }

    #[test]
    fn refuses_a_dataset_that_is_too_small() {
        let dir = tempfile::tempdir().expect("tempdir");
        let dataset_path = write_dataset(dir.path(), 3);

        let config = TrainerConfig {
            dataset_path,
            ..TrainerConfig::default()
        };

        assert!(train_and_evaluate(&config).is_err());
    }
}
