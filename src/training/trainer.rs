// src/training/trainer.rs

use crate::domain::{Listing, LocationLabel};
use crate::model::columns::schema_fingerprint;
use crate::model::{
    FeatureSchema, ForestParams, ModelArtifact, NumericFeature, PriceTarget, RandomForestRegressor,
    TrainingSet, ARTIFACT_VERSION,
};
use crate::training::evaluate::{holdout, Metrics};
use crate::training::loader::{discover_csv_files, load_listings, LoadReport, LoaderConfig};
use crate::training::TrainError;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Model-shaping options, independent of where the listings came from.
#[derive(Debug, Clone)]
pub struct FitOptions {
    pub target: PriceTarget,
    pub forest: ForestParams,
    pub reference_year: i32,
    /// Add a walk-minutes column when the listings carry one.
    pub use_walk: bool,
}

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub town_list: Option<PathBuf>,
    pub loader: LoaderConfig,
    pub fit: FitOptions,
    pub holdout: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub report: LoadReport,
    pub listings: usize,
    pub locations: usize,
    pub columns: usize,
    pub metrics: Option<Metrics>,
}

/// Read listing files, fit, and write the artifact (plus the town list when asked).
pub fn run(cfg: &TrainConfig) -> Result<TrainingSummary, TrainError> {
    let files = discover_csv_files(&cfg.inputs, &cfg.loader.exclude_markers)?;
    log::info!("reading {} listing file(s)", files.len());

    let (listings, report) = load_listings(&files, &cfg.loader);
    if listings.is_empty() {
        return Err(TrainError::NoListings);
    }
    log::info!(
        "{} usable listings ({} rows dropped, {} files skipped)",
        listings.len(),
        report.rows_dropped,
        report.files_skipped
    );

    let metrics = match cfg.holdout {
        Some(fraction) => {
            let m = holdout(&listings, fraction, &cfg.fit)?;
            log::info!(
                "hold-out: {} scored of {} test rows, MAE {:.0} yen, RMSE {:.0} yen, R² {:.3}",
                m.n_scored,
                m.n_test,
                m.mae,
                m.rmse,
                m.r2
            );
            Some(m)
        }
        None => None,
    };

    let artifact = build_artifact(&listings, &cfg.fit)?;
    artifact.save(&cfg.output)?;
    log::info!(
        "wrote {} ({} trees, {} columns, {} features per split)",
        cfg.output.display(),
        artifact.model.n_trees(),
        artifact.columns.len(),
        artifact.model.params().features_per_split(artifact.columns.len())
    );

    let locations = artifact.unit_prices.len();
    if let Some(path) = &cfg.town_list {
        write_town_list(path, &artifact)?;
        log::info!("wrote town list {}", path.display());
    }

    Ok(TrainingSummary {
        report,
        listings: artifact.n_listings,
        locations,
        columns: artifact.columns.len(),
        metrics,
    })
}

/// Fit a forest on `listings` and package it with its column list and
/// unit-price table. Location columns are sorted so their order is fixed.
pub fn build_artifact(listings: &[Listing], opts: &FitOptions) -> Result<ModelArtifact, TrainError> {
    let with_walk = opts.use_walk && listings.iter().any(|l| l.walk_minutes.is_some());
    let rows: Vec<&Listing> = listings
        .iter()
        .filter(|l| !with_walk || l.walk_minutes.is_some())
        .collect();
    if rows.is_empty() {
        return Err(TrainError::NoListings);
    }
    if rows.len() < listings.len() {
        log::info!(
            "{} listings without walk minutes left out of training",
            listings.len() - rows.len()
        );
    }

    let locations: Vec<LocationLabel> = rows
        .iter()
        .map(|l| l.location.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let code_of: HashMap<&LocationLabel, usize> =
        locations.iter().enumerate().map(|(i, l)| (l, i)).collect();

    let unit_prices = average_unit_prices(&rows);

    let mut features = vec![NumericFeature::Area, NumericFeature::Age];
    if with_walk {
        features.push(NumericFeature::Walk);
    }
    let numeric: Vec<Vec<f64>> = features
        .iter()
        .map(|f| {
            rows.iter()
                .map(|l| match f {
                    NumericFeature::Area => l.area,
                    NumericFeature::Age => l.age,
                    NumericFeature::Walk => l.walk_minutes.unwrap_or_default(),
                })
                .collect()
        })
        .collect();
    let codes: Vec<usize> = rows.iter().map(|l| code_of[&l.location]).collect();

    let y: Vec<f64> = rows
        .iter()
        .map(|l| match opts.target {
            PriceTarget::Price => l.price,
            PriceTarget::Ratio => l.unit_price() / unit_prices[&l.location.to_string()],
        })
        .collect();

    let data = TrainingSet::new(numeric)?.with_categorical(codes, locations.len())?;
    log::info!(
        "fitting {} trees on {} rows x {} columns",
        opts.forest.n_trees,
        data.n_rows(),
        data.n_features()
    );
    let model = RandomForestRegressor::fit(&data, &y, &opts.forest)?;

    let columns = FeatureSchema::new(&features, &locations).names();
    let artifact = ModelArtifact {
        version: ARTIFACT_VERSION,
        trained_at: Utc::now(),
        reference_year: opts.reference_year,
        target: opts.target,
        n_listings: rows.len(),
        schema_fingerprint: schema_fingerprint(&columns),
        columns,
        unit_prices,
        model,
    };
    artifact.validate()?;
    Ok(artifact)
}

fn average_unit_prices(rows: &[&Listing]) -> BTreeMap<String, f64> {
    let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for l in rows {
        let entry = acc.entry(l.location.to_string()).or_insert((0.0, 0));
        entry.0 += l.unit_price();
        entry.1 += 1;
    }
    acc.into_iter()
        .map(|(label, (sum, n))| (label, sum / n as f64))
        .collect()
}

fn write_town_list(path: &Path, artifact: &ModelArtifact) -> Result<(), TrainError> {
    let io_err = |source| TrainError::Io {
        path: path.to_path_buf(),
        source,
    };
    let towns: Vec<&String> = artifact.unit_prices.keys().collect();
    let file = File::create(path).map_err(io_err)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &towns)
        .map_err(|e| io_err(std::io::Error::other(e)))?;
    Ok(())
}
