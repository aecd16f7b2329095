// src/estimator/features.rs

use crate::domain::LocationLabel;
use crate::estimator::EstimateError;
use crate::model::columns::{FeatureSchema, NumericFeature};
use std::collections::{BTreeMap, HashMap};

/// Floor area bounds accepted from a user, in m².
pub const MIN_AREA: f64 = 1.0;
pub const MAX_AREA: f64 = 1_000.0;
/// Oldest building age accepted, in years.
pub const MAX_AGE: i32 = 150;
pub const MAX_WALK_MINUTES: f64 = 120.0;

/// What a user submits.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInput {
    pub location: String,
    pub area: f64,
    pub construction_year: i32,
    pub walk_minutes: Option<f64>,
}

/// Exact label → column lookup, built once from the artifact's columns.
#[derive(Debug, Clone)]
pub struct LocationIndex {
    columns: HashMap<String, usize>,
    by_ward: BTreeMap<&'static str, Vec<LocationLabel>>,
}

impl LocationIndex {
    pub fn from_schema(schema: &FeatureSchema) -> Self {
        let mut columns = HashMap::new();
        let mut by_ward: BTreeMap<&'static str, Vec<LocationLabel>> = BTreeMap::new();

        for (idx, label) in schema.locations() {
            columns.insert(label.to_string(), idx);
            by_ward.entry(label.ward()).or_default().push(label.clone());
        }
        for labels in by_ward.values_mut() {
            labels.sort();
        }

        Self { columns, by_ward }
    }

    /// Canonical label and column index for a user-supplied location.
    /// The `東京都` prefix is optional; nothing beyond that is guessed.
    pub fn resolve(&self, location: &str) -> Result<(usize, LocationLabel), EstimateError> {
        let unknown = || EstimateError::UnknownLocation(location.trim().to_string());
        let label = LocationLabel::parse(location).ok_or_else(unknown)?;
        let idx = self.columns.get(&label.to_string()).copied().ok_or_else(unknown)?;
        Ok((idx, label))
    }

    pub fn column_of(&self, location: &str) -> Result<usize, EstimateError> {
        self.resolve(location).map(|(idx, _)| idx)
    }

    pub fn contains(&self, location: &str) -> bool {
        self.column_of(location).is_ok()
    }

    pub fn locations_in(&self, ward: &str) -> &[LocationLabel] {
        self.by_ward.get(ward).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Turns a [`FeatureInput`] into a row aligned with the trained columns.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    width: usize,
    area: usize,
    age: usize,
    walk: Option<usize>,
    index: LocationIndex,
    reference_year: i32,
}

impl FeatureBuilder {
    pub fn new(schema: &FeatureSchema, reference_year: i32) -> Result<Self, String> {
        let area = schema
            .position(NumericFeature::Area)
            .ok_or("schema has no area column")?;
        let age = schema
            .position(NumericFeature::Age)
            .ok_or("schema has no age column")?;

        Ok(Self {
            width: schema.len(),
            area,
            age,
            walk: schema.position(NumericFeature::Walk),
            index: LocationIndex::from_schema(schema),
            reference_year,
        })
    }

    pub fn index(&self) -> &LocationIndex {
        &self.index
    }

    pub fn uses_walk(&self) -> bool {
        self.walk.is_some()
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Age in years for a construction year; rejects future and implausibly
    /// old buildings.
    pub fn age_for(&self, construction_year: i32) -> Result<i32, EstimateError> {
        let age = self
            .reference_year
            .checked_sub(construction_year)
            .ok_or(EstimateError::ImplausibleYear(construction_year))?;
        if age < 0 {
            return Err(EstimateError::FutureConstruction {
                year: construction_year,
                reference_year: self.reference_year,
            });
        }
        if age > MAX_AGE {
            return Err(EstimateError::ImplausibleYear(construction_year));
        }
        Ok(age)
    }

    /// Zero row with the numeric fields set and exactly one location
    /// indicator at 1.0.
    pub fn build(&self, input: &FeatureInput) -> Result<Vec<f64>, EstimateError> {
        if !(input.area.is_finite() && (MIN_AREA..=MAX_AREA).contains(&input.area)) {
            return Err(EstimateError::InvalidArea(input.area));
        }
        let age = self.age_for(input.construction_year)?;
        let location = self.index.column_of(&input.location)?;

        let mut row = vec![0.0; self.width];
        row[self.area] = input.area;
        row[self.age] = f64::from(age);

        if let Some(walk_idx) = self.walk {
            let walk = input.walk_minutes.ok_or(EstimateError::MissingWalk)?;
            if !(walk.is_finite() && (0.0..=MAX_WALK_MINUTES).contains(&walk)) {
                return Err(EstimateError::InvalidWalk(walk));
            }
            row[walk_idx] = walk;
        }

        row[location] = 1.0;
        Ok(row)
    }
}
