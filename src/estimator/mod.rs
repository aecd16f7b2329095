// src/estimator/mod.rs

pub mod features;
pub mod pricing;
pub mod scores;
pub mod tier_factors;

pub use features::{FeatureBuilder, FeatureInput, LocationIndex};
pub use pricing::{tier_prices, TierPrice};
pub use scores::SubScores;
pub use tier_factors::TierFactors;

use crate::model::{ArtifactError, ForestParams, ModelArtifact, PriceTarget, RandomForestRegressor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error("No match for location {0:?}")]
    UnknownLocation(String),
    #[error("Area must be a number of square metres between 1 and 1000, got {0}")]
    InvalidArea(f64),
    #[error("Construction year {year} is after the reference year {reference_year}")]
    FutureConstruction { year: i32, reference_year: i32 },
    #[error("Construction year {0} is not plausible")]
    ImplausibleYear(i32),
    #[error("This model needs the walking time to the nearest station")]
    MissingWalk,
    #[error("Walking time must be between 0 and 120 minutes, got {0}")]
    InvalidWalk(f64),
    #[error("The model produced an unusable price ({0})")]
    NonPositivePrediction(f64),
    #[error("The model could not score this input: {0}")]
    Prediction(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    pub location: String,
    pub area: f64,
    pub construction_year: i32,
    pub age: i32,
    pub walk_minutes: Option<f64>,
    /// Unrounded model output in yen.
    pub price: f64,
    pub base_price: i64,
    /// Estimated yen per m².
    pub unit_price: f64,
    /// Average yen per m² of the location in the training data.
    pub location_unit_price: f64,
    pub tier_factor: Option<f64>,
    pub tiers: Vec<TierPrice>,
    pub scores: SubScores,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub target: PriceTarget,
    pub trained_at: DateTime<Utc>,
    pub reference_year: i32,
    pub n_listings: usize,
    pub n_locations: usize,
    pub n_trees: usize,
    pub forest: ForestParams,
    pub uses_walk: bool,
    pub tier_factors: usize,
}

/// A loaded artifact ready to answer requests. Immutable once built.
#[derive(Debug, Clone)]
pub struct Estimator {
    model: Arc<RandomForestRegressor>,
    features: FeatureBuilder,
    target: PriceTarget,
    trained_at: DateTime<Utc>,
    n_listings: usize,
    unit_prices: HashMap<String, f64>,
    ranked_unit_prices: Vec<f64>,
    tier_factors: TierFactors,
}

impl Estimator {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        Self::from_artifact(ModelArtifact::load(path)?)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        let schema = artifact.validate()?;
        let features =
            FeatureBuilder::new(&schema, artifact.reference_year).map_err(ArtifactError::Schema)?;
        if features.index().is_empty() {
            return Err(ArtifactError::Schema("no location columns".into()));
        }

        let unit_prices: HashMap<String, f64> = artifact.unit_prices.into_iter().collect();
        let mut ranked_unit_prices: Vec<f64> = schema
            .locations()
            .filter_map(|(_, label)| unit_prices.get(&label.to_string()).copied())
            .collect();
        ranked_unit_prices.sort_by(f64::total_cmp);

        Ok(Self {
            model: Arc::new(artifact.model),
            features,
            target: artifact.target,
            trained_at: artifact.trained_at,
            n_listings: artifact.n_listings,
            unit_prices,
            ranked_unit_prices,
            tier_factors: TierFactors::default(),
        })
    }

    /// Attach per-location factors. They only affect ratio models; labels
    /// the model does not know are logged and ignored.
    pub fn with_tier_factors(mut self, factors: TierFactors) -> Self {
        if self.target == PriceTarget::Price && !factors.is_empty() {
            log::warn!("tier factors are ignored for a model trained on absolute prices");
        }
        for label in factors.labels() {
            if !self.features.index().contains(&label.to_string()) {
                log::warn!("tier factor for unknown location {label} ignored");
            }
        }
        self.tier_factors = factors;
        self
    }

    pub fn estimate(&self, input: &FeatureInput) -> Result<Estimate, EstimateError> {
        let row = self.features.build(input)?;
        let (_, label) = self.features.index().resolve(&input.location)?;
        let age = self.features.age_for(input.construction_year)?;

        let key = label.to_string();
        // Every indexed location has a unit price; validated at load.
        let location_unit_price = self.unit_prices.get(&key).copied().unwrap_or(f64::NAN);

        let prediction = self
            .model
            .predict(&row)
            .map_err(|e| EstimateError::Prediction(e.to_string()))?;
        let (price, tier_factor) = match self.target {
            PriceTarget::Price => (prediction, None),
            PriceTarget::Ratio => {
                let factor = self.tier_factors.get(&label);
                let ratio = prediction / factor.unwrap_or(1.0);
                (location_unit_price * ratio * input.area, factor)
            }
        };

        if !(price.is_finite() && price > 0.0) {
            return Err(EstimateError::NonPositivePrediction(price));
        }

        let unit_price = price / input.area;
        let scores = scores::sub_scores(&scores::ScoreInput {
            ranked_unit_prices: &self.ranked_unit_prices,
            location_unit_price,
            estimated_unit_price: unit_price,
            area: input.area,
            age: f64::from(age),
            walk_minutes: input.walk_minutes.filter(|_| self.uses_walk()),
        });

        Ok(Estimate {
            location: key,
            area: input.area,
            construction_year: input.construction_year,
            age,
            walk_minutes: input.walk_minutes.filter(|_| self.uses_walk()),
            price,
            base_price: pricing::round_yen(price),
            unit_price,
            location_unit_price,
            tier_factor,
            tiers: tier_prices(price),
            scores,
        })
    }

    pub fn locations(&self) -> &LocationIndex {
        self.features.index()
    }

    pub fn uses_walk(&self) -> bool {
        self.features.uses_walk()
    }

    pub fn reference_year(&self) -> i32 {
        self.features.reference_year()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            target: self.target,
            trained_at: self.trained_at,
            reference_year: self.reference_year(),
            n_listings: self.n_listings,
            n_locations: self.locations().len(),
            n_trees: self.model.n_trees(),
            forest: self.model.params().clone(),
            uses_walk: self.uses_walk(),
            tier_factors: self.tier_factors.len(),
        }
    }
}
