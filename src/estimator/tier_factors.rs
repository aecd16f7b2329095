// src/estimator/tier_factors.rs
//! Per-location correction factors for ratio models.
//!
//! The file is a UTF-8 CSV with a `location,factor` header. A factor scales
//! the predicted ratio down (`ratio / factor`), so a location whose listings
//! run 10% above its average gets `1.1`.

use crate::domain::LocationLabel;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TierFactorError {
    #[error("cannot open tier factor file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tier factor file is malformed: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {label:?} is not a Tokyo ward location")]
    UnknownLabel { line: u64, label: String },
    #[error("line {line}: factor for {label} must be a positive number, got {factor}")]
    BadFactor { line: u64, label: String, factor: f64 },
    #[error("line {line}: {label} is listed twice")]
    Duplicate { line: u64, label: String },
}

#[derive(Debug, Deserialize)]
struct FactorRow {
    location: String,
    factor: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierFactors {
    factors: HashMap<LocationLabel, f64>,
}

impl TierFactors {
    pub fn load(path: &Path) -> Result<Self, TierFactorError> {
        let file = File::open(path).map_err(|source| TierFactorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TierFactorError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut factors = HashMap::new();
        for result in reader.deserialize::<FactorRow>() {
            let row = result?;
            // Header is line 1.
            let line = factors.len() as u64 + 2;

            let label = LocationLabel::parse(&row.location).ok_or_else(|| TierFactorError::UnknownLabel {
                line,
                label: row.location.clone(),
            })?;
            if !(row.factor.is_finite() && row.factor > 0.0) {
                return Err(TierFactorError::BadFactor {
                    line,
                    label: label.to_string(),
                    factor: row.factor,
                });
            }
            if factors.insert(label.clone(), row.factor).is_some() {
                return Err(TierFactorError::Duplicate {
                    line,
                    label: label.to_string(),
                });
            }
        }

        Ok(Self { factors })
    }

    pub fn get(&self, label: &LocationLabel) -> Option<f64> {
        self.factors.get(label).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = &LocationLabel> + '_ {
        self.factors.keys()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_factors_with_or_without_prefecture() {
        let csv = "location,factor\n東京都港区芝浦,1.1\n渋谷区神南1丁目, 0.95 \n";
        let factors = TierFactors::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(factors.len(), 2);
        let shibaura = LocationLabel::new("港区", "芝浦").unwrap();
        let jinnan = LocationLabel::new("渋谷区", "神南1丁目").unwrap();
        assert_eq!(factors.get(&shibaura), Some(1.1));
        assert_eq!(factors.get(&jinnan), Some(0.95));
        assert_eq!(factors.get(&LocationLabel::new("港区", "海岸").unwrap()), None);
    }

    #[test]
    fn rejects_bad_rows() {
        let zero = "location,factor\n東京都港区芝浦,0\n";
        assert!(matches!(
            TierFactors::from_reader(zero.as_bytes()),
            Err(TierFactorError::BadFactor { line: 2, .. })
        ));

        let osaka = "location,factor\n東京都港区芝浦,1.0\n大阪府大阪市北区,1.0\n";
        assert!(matches!(
            TierFactors::from_reader(osaka.as_bytes()),
            Err(TierFactorError::UnknownLabel { line: 3, .. })
        ));

        let twice = "location,factor\n東京都港区芝浦,1.0\n港区芝浦,1.2\n";
        assert!(matches!(
            TierFactors::from_reader(twice.as_bytes()),
            Err(TierFactorError::Duplicate { line: 3, .. })
        ));

        let text = "location,factor\n東京都港区芝浦,high\n";
        assert!(matches!(
            TierFactors::from_reader(text.as_bytes()),
            Err(TierFactorError::Csv(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TierFactors::load(Path::new("/nonexistent/tier_factors.csv")).unwrap_err();
        assert!(matches!(err, TierFactorError::Io { .. }));
    }
}
