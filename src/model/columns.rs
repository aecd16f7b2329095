// src/model/columns.rs
//! Feature column naming shared by the trainer and the estimator.
//!
//! Numeric columns come first, then one `location_<label>` indicator per
//! known location in sorted label order. The artifact stores the rendered
//! names; both sides rebuild a [`FeatureSchema`] from them.

use crate::domain::LocationLabel;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

pub const LOCATION_PREFIX: &str = "location_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericFeature {
    Area,
    Age,
    Walk,
}

impl NumericFeature {
    pub const fn column(self) -> &'static str {
        match self {
            NumericFeature::Area => "area",
            NumericFeature::Age => "age",
            NumericFeature::Walk => "walk",
        }
    }

    fn from_column(name: &str) -> Option<Self> {
        match name {
            "area" => Some(NumericFeature::Area),
            "age" => Some(NumericFeature::Age),
            "walk" => Some(NumericFeature::Walk),
            _ => None,
        }
    }
}

pub fn location_column(label: &LocationLabel) -> String {
    format!("{LOCATION_PREFIX}{label}")
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(NumericFeature),
    Location(LocationLabel),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<Column>,
}

impl FeatureSchema {
    pub fn new(numeric: &[NumericFeature], locations: &[LocationLabel]) -> Self {
        let columns = numeric
            .iter()
            .copied()
            .map(Column::Numeric)
            .chain(locations.iter().cloned().map(Column::Location))
            .collect();
        Self { columns }
    }

    /// Rebuild a schema from rendered column names.
    pub fn from_names(names: &[String]) -> Result<Self, String> {
        let mut columns = Vec::with_capacity(names.len());
        let mut seen_location = false;

        for name in names {
            let column = if let Some(label) = name.strip_prefix(LOCATION_PREFIX) {
                seen_location = true;
                let label = LocationLabel::parse(label)
                    .ok_or_else(|| format!("column {name:?} does not name a Tokyo ward location"))?;
                Column::Location(label)
            } else {
                let feature = NumericFeature::from_column(name)
                    .ok_or_else(|| format!("unknown column {name:?}"))?;
                if seen_location {
                    return Err(format!("numeric column {name:?} after location columns"));
                }
                Column::Numeric(feature)
            };

            if columns.contains(&column) {
                return Err(format!("duplicate column {name:?}"));
            }
            columns.push(column);
        }

        let schema = Self { columns };
        if schema.position(NumericFeature::Area).is_none() || schema.position(NumericFeature::Age).is_none() {
            return Err("schema needs both area and age columns".into());
        }
        Ok(schema)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| match c {
                Column::Numeric(f) => f.column().to_string(),
                Column::Location(label) => location_column(label),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn position(&self, feature: NumericFeature) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| *c == Column::Numeric(feature))
    }

    /// Locations with their column index, in schema order.
    pub fn locations(&self) -> impl Iterator<Item = (usize, &LocationLabel)> + '_ {
        self.columns.iter().enumerate().filter_map(|(i, c)| match c {
            Column::Location(label) => Some((i, label)),
            Column::Numeric(_) => None,
        })
    }
}

/// SHA-256 over the newline-joined column names, hex encoded.
pub fn schema_fingerprint(names: &[String]) -> String {
    let mut hasher = Sha256::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(b"\n");
    }
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}
