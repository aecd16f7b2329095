pub mod evaluate;
pub mod loader;
pub mod trainer;

pub use trainer::{build_artifact, run, TrainConfig};

use crate::model::{ArtifactError, ForestError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("no listing CSV files found in {0}")]
    NoInputFiles(String),
    #[error("unknown encoding label {0:?}")]
    UnknownEncoding(String),
    #[error("no usable listings after address normalization")]
    NoListings,
    #[error("hold-out fraction must be in (0, 1), got {0}")]
    BadHoldout(f64),
    #[error(transparent)]
    Forest(#[from] ForestError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
