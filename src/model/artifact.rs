// src/model/artifact.rs

use crate::model::columns::{schema_fingerprint, FeatureSchema};
use crate::model::forest::RandomForestRegressor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot open model file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model file is not a valid artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported artifact version {found} (expected {})", ARTIFACT_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("column list does not match its fingerprint; the artifact was edited or truncated")]
    FingerprintMismatch,
    #[error("bad column list: {0}")]
    Schema(String),
    #[error("model expects {model} features but the artifact lists {columns} columns")]
    ColumnCountMismatch { model: usize, columns: usize },
    #[error("no average unit price for {0}")]
    MissingUnitPrice(String),
    #[error("invalid model: {0}")]
    Model(String),
}

/// What the forest was trained to predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTarget {
    /// Sale price in yen.
    Price,
    /// `price / (location unit price × area)`.
    Ratio,
}

/// Everything the estimator needs, written once by the trainer.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    pub trained_at: DateTime<Utc>,
    pub reference_year: i32,
    pub target: PriceTarget,
    pub n_listings: usize,
    /// Ordered feature columns exactly as used for fitting.
    pub columns: Vec<String>,
    pub schema_fingerprint: String,
    /// Average yen per m², keyed by location label.
    pub unit_prices: BTreeMap<String, f64>,
    pub model: RandomForestRegressor,
}

impl ModelArtifact {
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let io_err = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }

    /// Read and validate an artifact.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: Self = serde_json::from_reader(BufReader::new(file))?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Checks that the column list is intact and agrees with the model and
    /// the unit-price table. Returns the parsed schema.
    pub fn validate(&self) -> Result<FeatureSchema, ArtifactError> {
        if self.version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.version,
            });
        }
        if schema_fingerprint(&self.columns) != self.schema_fingerprint {
            return Err(ArtifactError::FingerprintMismatch);
        }

        let schema = FeatureSchema::from_names(&self.columns).map_err(ArtifactError::Schema)?;

        if self.model.n_features() != schema.len() {
            return Err(ArtifactError::ColumnCountMismatch {
                model: self.model.n_features(),
                columns: schema.len(),
            });
        }
        self.model
            .params()
            .validate()
            .map_err(|e| ArtifactError::Model(e.to_string()))?;

        for (_, label) in schema.locations() {
            let key = label.to_string();
            match self.unit_prices.get(&key) {
                Some(p) if p.is_finite() && *p > 0.0 => {}
                _ => return Err(ArtifactError::MissingUnitPrice(key)),
            }
        }

        Ok(schema)
    }
}
