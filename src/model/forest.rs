// src/model/forest.rs
//! Random forest regressor.
//!
//! A thin wrapper over smartcore's `RandomForestRegressor` that keeps the
//! parameters it was fitted with and the width of the rows it expects, so a
//! deserialized forest can be checked against the artifact's column list.
//!
//! Training data arrives column-major: dense numeric columns followed by one
//! indicator column per level of a single categorical feature.

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor as Forest, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use thiserror::Error;

type DenseForest = Forest<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Error)]
pub enum ForestError {
    #[error("training set is empty")]
    Empty,
    #[error("column length mismatch: expected {expected} rows, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("category code {code} out of range for {levels} levels")]
    BadCategory { code: usize, levels: usize },
    #[error("invalid forest parameters: {0}")]
    InvalidParams(String),
    #[error("row has {got} features, the forest expects {expected}")]
    RowWidth { expected: usize, got: usize },
    #[error("forest training failed: {0}")]
    Fit(String),
    #[error("forest prediction failed: {0}")]
    Predict(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Fraction of features considered at each split, in (0, 1].
    pub max_features: f64,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 15,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 1.0,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<(), ForestError> {
        if self.n_trees == 0 {
            return Err(ForestError::InvalidParams("n_trees must be at least 1".into()));
        }
        if self.max_depth == 0 || self.max_depth > usize::from(u16::MAX) {
            return Err(ForestError::InvalidParams(format!(
                "max_depth must be between 1 and {}",
                u16::MAX
            )));
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidParams(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForestError::InvalidParams(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if !(self.max_features > 0.0 && self.max_features <= 1.0) {
            return Err(ForestError::InvalidParams(format!(
                "max_features must be in (0, 1], got {}",
                self.max_features
            )));
        }
        Ok(())
    }

    /// Features tried per split for a matrix `n_features` wide; at least one.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn features_per_split(&self, n_features: usize) -> usize {
        ((self.max_features * n_features as f64).ceil() as usize).clamp(1, n_features.max(1))
    }

    fn smartcore(&self, n_features: usize) -> Result<RandomForestRegressorParameters, ForestError> {
        self.validate()?;
        let max_depth = u16::try_from(self.max_depth)
            .map_err(|_| ForestError::InvalidParams("max_depth is too large".into()))?;

        Ok(RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees)
            .with_max_depth(max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_m(self.features_per_split(n_features))
            .with_keep_samples(false)
            .with_seed(self.seed))
    }
}

/// Column-major training matrix, turned into smartcore's dense rows on fit.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    n_rows: usize,
    numeric: Vec<Vec<f64>>,
    codes: Vec<usize>,
    n_levels: usize,
}

impl TrainingSet {
    pub fn new(numeric: Vec<Vec<f64>>) -> Result<Self, ForestError> {
        let n_rows = numeric.first().map_or(0, Vec::len);
        if let Some(col) = numeric.iter().find(|c| c.len() != n_rows) {
            return Err(ForestError::LengthMismatch {
                expected: n_rows,
                got: col.len(),
            });
        }
        Ok(Self {
            n_rows,
            numeric,
            codes: Vec::new(),
            n_levels: 0,
        })
    }

    /// Attach a categorical feature, expanded as `n_levels` indicator
    /// columns placed after the numeric ones.
    pub fn with_categorical(mut self, codes: Vec<usize>, n_levels: usize) -> Result<Self, ForestError> {
        if self.numeric.is_empty() {
            self.n_rows = codes.len();
        } else if codes.len() != self.n_rows {
            return Err(ForestError::LengthMismatch {
                expected: self.n_rows,
                got: codes.len(),
            });
        }
        if let Some(&code) = codes.iter().find(|&&c| c >= n_levels) {
            return Err(ForestError::BadCategory {
                code,
                levels: n_levels,
            });
        }
        self.codes = codes;
        self.n_levels = n_levels;
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.numeric.len() + self.n_levels
    }

    /// One dense row per sample, indicators expanded.
    fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.n_rows)
            .map(|r| {
                let mut row = vec![0.0; self.n_features()];
                for (c, col) in self.numeric.iter().enumerate() {
                    row[c] = col[r];
                }
                if let Some(&code) = self.codes.get(r) {
                    row[self.numeric.len() + code] = 1.0;
                }
                row
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: ForestParams,
    n_features: usize,
    forest: DenseForest,
}

impl RandomForestRegressor {
    /// Fit `params.n_trees` trees on bootstrap samples. The same data and
    /// seed always give the same forest.
    pub fn fit(data: &TrainingSet, y: &[f64], params: &ForestParams) -> Result<Self, ForestError> {
        params.validate()?;
        if data.n_rows() == 0 || data.n_features() == 0 {
            return Err(ForestError::Empty);
        }
        if y.len() != data.n_rows() {
            return Err(ForestError::LengthMismatch {
                expected: data.n_rows(),
                got: y.len(),
            });
        }

        let n_features = data.n_features();
        let x = DenseMatrix::from_2d_vec(&data.rows());
        let forest = DenseForest::fit(&x, &y.to_vec(), params.smartcore(n_features)?)
            .map_err(|e| ForestError::Fit(e.to_string()))?;

        Ok(Self {
            params: params.clone(),
            n_features,
            forest,
        })
    }

    /// Mean of the tree predictions for one full-width row.
    pub fn predict(&self, row: &[f64]) -> Result<f64, ForestError> {
        if row.len() != self.n_features {
            return Err(ForestError::RowWidth {
                expected: self.n_features,
                got: row.len(),
            });
        }
        let x = DenseMatrix::from_2d_vec(&vec![row.to_vec()]);
        let y = self
            .forest
            .predict(&x)
            .map_err(|e| ForestError::Predict(e.to_string()))?;
        y.first()
            .copied()
            .ok_or_else(|| ForestError::Predict("no output row".into()))
    }

    pub fn n_trees(&self) -> usize {
        self.params.n_trees
    }

    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}
