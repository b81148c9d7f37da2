use std::path::Path;

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// In-memory feature table for the regression stage.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature matrix, one row per sample.
    pub features: Vec<Vec<f64>>,
    /// Target values, parallel to `features`.
    pub labels: Vec<f64>,
    pub feature_names: Vec<String>,
}

pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            feature_names,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn add_sample(&mut self, features: Vec<f64>, label: f64) {
        assert_eq!(features.len(), self.feature_names.len());
        self.features.push(features);
        self.labels.push(label);
    }

    /// Loads the assembled dataset file. The merged file carries two metadata
    /// lines before its column-name header, so callers pass `skip_rows = 2`.
    /// Rows with a missing value in any selected column are skipped.
    pub fn from_csv(
        path: &Path,
        skip_rows: usize,
        feature_names: &[String],
        target: &str,
    ) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_skip_rows(skip_rows)
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("failed to open dataset {}", path.display()))?
            .finish()
            .with_context(|| format!("failed to read dataset {}", path.display()))?;

        let mut columns = Vec::with_capacity(feature_names.len());
        for name in feature_names {
            columns.push(numeric_column(&df, name)?);
        }
        let labels = numeric_column(&df, target)?;

        let mut dataset = Dataset::new(feature_names.to_vec());
        'rows: for row in 0..df.height() {
            let mut sample = Vec::with_capacity(columns.len());
            for column in &columns {
                match column[row] {
                    Some(value) => sample.push(value),
                    None => continue 'rows,
                }
            }
            let Some(label) = labels[row] else {
                continue;
            };
            dataset.add_sample(sample, label);
        }

        if dataset.n_samples() == 0 {
            bail!("dataset {} contains no usable rows", path.display());
        }
        Ok(dataset)
    }

    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Seeded shuffle split; the first `test_ratio` share of the shuffled
    /// indices becomes the held-out set.
    pub fn random_split(&self, test_ratio: f64, seed: u64) -> Split {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);

        let test_size = (test_ratio * n as f64) as usize;
        let (test_indices, train_indices) = indices.split_at(test_size);

        Split {
            train: self.subset(train_indices),
            test: self.subset(test_indices),
        }
    }

    /// Random sample with replacement, used for bagging ensemble members.
    pub fn bootstrap_sample(&self, seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();
        let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
        self.subset(&indices)
    }

    /// Contiguous k-fold partition: fold sizes differ by at most one, every
    /// index appears in exactly one validation fold.
    pub fn kfold_indices(&self, k: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
        let n = self.n_samples();
        let k = k.max(1).min(n.max(1));
        let base = n / k;
        let remainder = n % k;

        let mut folds = Vec::with_capacity(k);
        let mut offset = 0;
        for fold in 0..k {
            let size = base + usize::from(fold < remainder);
            let validation: Vec<usize> = (offset..offset + size).collect();
            let training: Vec<usize> = (0..n).filter(|i| !(offset..offset + size).contains(i)).collect();
            folds.push((training, validation));
            offset += size;
        }
        folds
    }
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .with_context(|| format!("dataset is missing column '{name}'"))?;
    let casted = column
        .cast(&DataType::Float64)
        .with_context(|| format!("column '{name}' is not numeric"))?;
    let values = casted
        .f64()
        .with_context(|| format!("column '{name}' is not numeric"))?;
    Ok(values.into_iter().collect())
}
