// src/training/evaluate.rs

use crate::domain::Listing;
use crate::estimator::{Estimator, FeatureInput};
use crate::training::trainer::FitOptions;
use crate::training::{build_artifact, TrainError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub n_train: usize,
    pub n_test: usize,
    /// Test rows the estimator could price (locations unseen in the
    /// training split cannot be).
    pub n_scored: usize,
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// Fit on a shuffled split and score the held-out rows through the same
/// [`Estimator`] the server uses.
pub fn holdout(listings: &[Listing], fraction: f64, opts: &FitOptions) -> Result<Metrics, TrainError> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(TrainError::BadHoldout(fraction));
    }
    if listings.len() < 2 {
        return Err(TrainError::NoListings);
    }

    let mut order: Vec<usize> = (0..listings.len()).collect();
    order.shuffle(&mut StdRng::seed_from_u64(opts.forest.seed));

    let n_test = ((listings.len() as f64 * fraction).round() as usize).clamp(1, listings.len() - 1);
    let (test_idx, train_idx) = order.split_at(n_test);

    let train: Vec<Listing> = train_idx.iter().map(|&i| listings[i].clone()).collect();
    let estimator = Estimator::from_artifact(build_artifact(&train, opts)?)?;

    let pairs: Vec<(f64, f64)> = test_idx
        .iter()
        .map(|&i| &listings[i])
        .filter_map(|l| {
            let input = FeatureInput {
                location: l.location.to_string(),
                area: l.area,
                construction_year: opts.reference_year - l.age as i32,
                walk_minutes: l.walk_minutes,
            };
            estimator.estimate(&input).ok().map(|e| (l.price, e.price))
        })
        .collect();

    let (mae, rmse, r2) = score(&pairs);
    Ok(Metrics {
        n_train: train.len(),
        n_test,
        n_scored: pairs.len(),
        mae,
        rmse,
        r2,
    })
}

/// (MAE, RMSE, R²) over (actual, predicted) pairs; NaN when empty.
pub fn score(pairs: &[(f64, f64)]) -> (f64, f64, f64) {
    if pairs.is_empty() {
        return (f64::NAN, f64::NAN, f64::NAN);
    }
    let n = pairs.len() as f64;
    let mean = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let abs: f64 = pairs.iter().map(|(a, p)| (a - p).abs()).sum();
    let sse: f64 = pairs.iter().map(|(a, p)| (a - p).powi(2)).sum();
    let sst: f64 = pairs.iter().map(|(a, _)| (a - mean).powi(2)).sum();
    let r2 = if sst > 0.0 { 1.0 - sse / sst } else { f64::NAN };
    (abs / n, (sse / n).sqrt(), r2)
}
