// src/domain/location.rs

use crate::geos::{canonical_ward, PREFECTURE, TOKYO_WARDS};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Categorical unit of the pricing model: one of the 23 wards plus the
/// town token that follows it, e.g. `東京都渋谷区神南1丁目`.
///
/// Ordering is by (ward, town), which matches ordering the rendered labels
/// because no ward name is a prefix of another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct LocationLabel {
    ward: &'static str,
    town: String,
}

impl LocationLabel {
    pub fn new(ward: &str, town: impl Into<String>) -> Option<Self> {
        Some(Self {
            ward: canonical_ward(ward)?,
            town: town.into(),
        })
    }

    /// Parse a rendered label. The `東京都` prefix is optional; the rest is
    /// taken verbatim so parsing inverts `Display`.
    pub fn parse(label: &str) -> Option<Self> {
        let rest = label.strip_prefix(PREFECTURE).unwrap_or(label);

        let &(ward, _) = TOKYO_WARDS
            .iter()
            .find(|(kanji, _)| rest.starts_with(kanji))?;

        Some(Self {
            ward,
            town: rest[ward.len()..].to_string(),
        })
    }

    pub fn ward(&self) -> &'static str {
        self.ward
    }

    pub fn town(&self) -> &str {
        &self.town
    }
}

impl fmt::Display for LocationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFECTURE}{}{}", self.ward, self.town)
    }
}

impl From<LocationLabel> for String {
    fn from(label: LocationLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for LocationLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not a Tokyo ward location: {value}"))
    }
}

impl<'de> Deserialize<'de> for LocationLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}
