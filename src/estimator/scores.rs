// src/estimator/scores.rs
//! 0–100 diagnostic scores shown on the result chart. They describe the
//! inputs relative to the trained market and do not feed the price.

use serde::Serialize;

const SMALL_AREA: f64 = 20.0;
const LARGE_AREA: f64 = 120.0;
const OLD_AGE: f64 = 50.0;
const FAR_WALK: f64 = 20.0;
const NEUTRAL: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    /// Percentile of the location's unit price among all locations.
    pub location: f64,
    pub size: f64,
    pub newness: f64,
    /// Neutral when walk minutes are unknown.
    pub access: f64,
    /// 50 at the location average; higher when the estimate is cheaper per m².
    pub value: f64,
}

impl SubScores {
    pub fn axes(&self) -> [(&'static str, f64); 5] {
        [
            ("Location", self.location),
            ("Size", self.size),
            ("Newness", self.newness),
            ("Access", self.access),
            ("Value", self.value),
        ]
    }
}

pub struct ScoreInput<'a> {
    /// All location unit prices, sorted ascending.
    pub ranked_unit_prices: &'a [f64],
    pub location_unit_price: f64,
    pub estimated_unit_price: f64,
    pub area: f64,
    pub age: f64,
    pub walk_minutes: Option<f64>,
}

pub fn sub_scores(input: &ScoreInput<'_>) -> SubScores {
    SubScores {
        location: percentile(input.ranked_unit_prices, input.location_unit_price),
        size: linear(input.area, SMALL_AREA, LARGE_AREA),
        newness: 100.0 - linear(input.age, 0.0, OLD_AGE),
        access: input
            .walk_minutes
            .map_or(NEUTRAL, |w| 100.0 - linear(w, 0.0, FAR_WALK)),
        value: clamp(NEUTRAL * input.location_unit_price / input.estimated_unit_price),
    }
}

fn percentile(sorted: &[f64], value: f64) -> f64 {
    if sorted.len() < 2 {
        return NEUTRAL;
    }
    let below = sorted.partition_point(|&p| p < value);
    clamp(100.0 * below as f64 / (sorted.len() - 1) as f64)
}

fn linear(x: f64, lo: f64, hi: f64) -> f64 {
    clamp(100.0 * (x - lo) / (hi - lo))
}

fn clamp(score: f64) -> f64 {
    if score.is_nan() {
        NEUTRAL
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(ranked: &'a [f64], unit: f64) -> ScoreInput<'a> {
        ScoreInput {
            ranked_unit_prices: ranked,
            location_unit_price: unit,
            estimated_unit_price: unit,
            area: 70.0,
            age: 10.0,
            walk_minutes: None,
        }
    }

    #[test]
    fn location_percentile() {
        let ranked = [500_000.0, 800_000.0, 1_200_000.0];
        assert_eq!(sub_scores(&input(&ranked, 500_000.0)).location, 0.0);
        assert_eq!(sub_scores(&input(&ranked, 800_000.0)).location, 50.0);
        assert_eq!(sub_scores(&input(&ranked, 1_200_000.0)).location, 100.0);
        assert_eq!(sub_scores(&input(&[900_000.0], 900_000.0)).location, 50.0);
    }

    #[test]
    fn scores_stay_in_range() {
        let ranked = [500_000.0, 800_000.0];
        let mut i = input(&ranked, 800_000.0);
        i.area = 500.0;
        i.age = 90.0;
        i.walk_minutes = Some(3.0);
        i.estimated_unit_price = 100.0;

        let s = sub_scores(&i);
        assert_eq!(s.size, 100.0);
        assert_eq!(s.newness, 0.0);
        assert!((s.access - 85.0).abs() < 1e-9);
        assert_eq!(s.value, 100.0);
        for (_, v) in s.axes() {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn unknown_walk_is_neutral_and_parity_is_fair_value() {
        let s = sub_scores(&input(&[1.0, 2.0], 2.0));
        assert_eq!(s.access, 50.0);
        assert_eq!(s.value, 50.0);
        assert_eq!(s.size, 50.0);
        assert_eq!(s.newness, 80.0);
    }
}
