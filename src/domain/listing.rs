// src/domain/listing.rs

use crate::domain::location::LocationLabel;
use crate::domain::normalize_address;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// One row of a scraped listing CSV, as the portal exports it.
#[derive(Debug, Default, Deserialize)]
pub struct RawListing {
    #[serde(rename = "所在地", default)]
    pub address: Option<String>,
    #[serde(rename = "販売価格", default)]
    pub price: Option<String>,
    #[serde(rename = "専有面積", default)]
    pub area: Option<String>,
    #[serde(rename = "築年月", default)]
    pub built: Option<String>,
    #[serde(rename = "沿線・駅", default)]
    pub access: Option<String>,
}

/// A listing that survived normalization and is usable for training.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub location: LocationLabel,
    /// Floor area in m².
    pub area: f64,
    /// Years since construction, relative to the training reference year.
    pub age: f64,
    pub walk_minutes: Option<f64>,
    /// Sale price in yen.
    pub price: f64,
}

impl Listing {
    pub fn unit_price(&self) -> f64 {
        self.price / self.area
    }
}

impl RawListing {
    /// Returns `None` for rows that cannot be used: unknown ward, missing or
    /// unparseable fields, non-positive values, or construction after
    /// `reference_year`.
    pub fn into_listing(self, reference_year: i32) -> Option<Listing> {
        let location = normalize_address(self.address.as_deref()?)?;
        let price = parse_price_yen(self.price.as_deref()?)?;
        let area = parse_area_sqm(self.area.as_deref()?)?;
        let year = parse_built_year(self.built.as_deref()?)?;

        let age = reference_year.checked_sub(year)?;
        if age < 0 || price <= 0.0 || area <= 0.0 {
            return None;
        }

        Some(Listing {
            location,
            area,
            age: f64::from(age),
            walk_minutes: self.access.as_deref().and_then(parse_walk_minutes),
            price,
        })
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("listing pattern is valid"))
}

/// `5480万円`, `1億2000万円`, `1億円`, `54,800,000円`. Ranges keep the lower bound.
pub fn parse_price_yen(s: &str) -> Option<f64> {
    static OKU_MAN: OnceLock<Regex> = OnceLock::new();
    static YEN: OnceLock<Regex> = OnceLock::new();

    let s: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();

    let caps = regex(&OKU_MAN, r"(?:(\d+(?:\.\d+)?)億)?(?:(\d+(?:\.\d+)?)万)?")
        .captures_iter(&s)
        .find(|c| c.get(1).is_some() || c.get(2).is_some());

    if let Some(caps) = caps {
        let oku: f64 = caps.get(1).map_or(Ok(0.0), |m| m.as_str().parse()).ok()?;
        let man: f64 = caps.get(2).map_or(Ok(0.0), |m| m.as_str().parse()).ok()?;
        return Some(oku * 100_000_000.0 + man * 10_000.0);
    }

    regex(&YEN, r"(\d+(?:\.\d+)?)円")
        .captures(&s)
        .and_then(|c| c[1].parse().ok())
}

/// `65.3㎡`, `65.3m2`, `65.3m²（壁芯）`.
pub fn parse_area_sqm(s: &str) -> Option<f64> {
    static AREA: OnceLock<Regex> = OnceLock::new();
    regex(&AREA, r"(\d+(?:\.\d+)?)\s*(?:㎡|m2|m²|平米)?")
        .captures(s)
        .and_then(|c| c[1].parse().ok())
}

/// First four-digit year, e.g. `2015年3月`.
pub fn parse_built_year(s: &str) -> Option<i32> {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    regex(&YEAR, r"(\d{4})")
        .captures(s)
        .and_then(|c| c[1].parse().ok())
}

/// Shortest `徒歩N分` in an access string such as `東急田園都市線「渋谷」徒歩7分`.
pub fn parse_walk_minutes(s: &str) -> Option<f64> {
    static WALK: OnceLock<Regex> = OnceLock::new();
    regex(&WALK, r"徒歩\s*(\d+)\s*分")
        .captures_iter(s)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .min()
        .map(f64::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(address: &str, price: &str, area: &str, built: &str) -> RawListing {
        RawListing {
            address: Some(address.into()),
            price: Some(price.into()),
            area: Some(area.into()),
            built: Some(built.into()),
            access: None,
        }
    }

    #[test]
    fn prices() {
        assert_eq!(parse_price_yen("5480万円"), Some(54_800_000.0));
        assert_eq!(parse_price_yen("1億2000万円"), Some(120_000_000.0));
        assert_eq!(parse_price_yen("1億円"), Some(100_000_000.0));
        assert_eq!(parse_price_yen("5,480万円～6,200万円"), Some(54_800_000.0));
        assert_eq!(parse_price_yen("54,800,000円"), Some(54_800_000.0));
        assert_eq!(parse_price_yen("未定"), None);
    }

    #[test]
    fn areas() {
        assert_eq!(parse_area_sqm("65.3㎡"), Some(65.3));
        assert_eq!(parse_area_sqm("70.12m2（壁芯）"), Some(70.12));
        assert_eq!(parse_area_sqm("-"), None);
    }

    #[test]
    fn years_and_walk() {
        assert_eq!(parse_built_year("2015年3月"), Some(2015));
        assert_eq!(parse_built_year("新築"), None);
        assert_eq!(
            parse_walk_minutes("東京メトロ銀座線「表参道」徒歩8分 / JR山手線「渋谷」徒歩12分"),
            Some(8.0)
        );
        assert_eq!(parse_walk_minutes("バス10分"), None);
    }

    #[test]
    fn converts_a_complete_row() {
        let mut row = raw("東京都渋谷区神南1丁目2-3", "8500万円", "60.5㎡", "2015年3月");
        row.access = Some("JR山手線「渋谷」徒歩6分".into());

        let listing = row.into_listing(2026).unwrap();
        assert_eq!(listing.location.to_string(), "東京都渋谷区神南1丁目");
        assert_eq!(listing.price, 85_000_000.0);
        assert_eq!(listing.area, 60.5);
        assert_eq!(listing.age, 11.0);
        assert_eq!(listing.walk_minutes, Some(6.0));
    }

    #[test]
    fn drops_unusable_rows() {
        assert!(raw("東京都八王子市", "3000万円", "60㎡", "2015年")
            .into_listing(2026)
            .is_none());
        assert!(raw("東京都港区芝浦", "3000万円", "60㎡", "2030年")
            .into_listing(2026)
            .is_none());
        assert!(raw("東京都港区芝浦", "価格未定", "60㎡", "2015年")
            .into_listing(2026)
            .is_none());
        assert!(RawListing::default().into_listing(2026).is_none());
    }

    #[test]
    fn extreme_reference_years_drop_the_row() {
        let row = || raw("東京都港区芝浦", "3000万円", "60㎡", "2015年");
        assert!(row().into_listing(i32::MIN).is_none());
        assert!(row().into_listing(1990).is_none());
        assert_eq!(row().into_listing(i32::MAX).map(|l| l.location.town().to_string()).as_deref(), Some("芝浦"));
    }
}
