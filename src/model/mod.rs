pub mod artifact;
pub mod columns;
pub mod forest;

pub use artifact::{ArtifactError, ModelArtifact, PriceTarget, ARTIFACT_VERSION};
pub use columns::{FeatureSchema, NumericFeature};
pub use forest::{ForestError, ForestParams, RandomForestRegressor, TrainingSet};
