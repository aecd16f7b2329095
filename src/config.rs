// config.rs
//! Command-line and environment configuration.

use crate::estimator::FeatureInput;
use crate::model::{ForestParams, PriceTarget};
use crate::training::loader::{encoding_for_label, LoaderConfig, DEFAULT_EXCLUDE_MARKERS};
use crate::training::trainer::FitOptions;
use crate::training::{TrainConfig, TrainError};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_ARTIFACT: &str = "model.json";
pub const DEFAULT_WORKERS: usize = 8;
/// Year ages are measured against.
pub const REFERENCE_YEAR: i32 = 2026;

#[derive(Parser, Debug)]
#[command(
    name = "tokyo-price-estimator",
    version,
    about = "Condo price estimates for Tokyo's 23 wards"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the estimator web page and JSON API.
    Serve(ServeConfig),
    /// Fit a model from listing CSVs and write the artifact.
    Train(TrainArgs),
    /// Price one condo from the command line.
    Estimate(EstimateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    #[arg(long, env = "ESTIMATOR_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: SocketAddr,
    #[arg(long, env = "ESTIMATOR_ARTIFACT", default_value = DEFAULT_ARTIFACT)]
    pub artifact: PathBuf,
    /// CSV of `location,factor` rows applied to ratio models.
    #[arg(long, env = "ESTIMATOR_TIER_FACTORS")]
    pub tier_factors: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArg {
    Price,
    Ratio,
}

impl From<TargetArg> for PriceTarget {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::Price => PriceTarget::Price,
            TargetArg::Ratio => PriceTarget::Ratio,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Listing CSV files or directories containing them.
    #[arg(long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    #[arg(long, env = "ESTIMATOR_ARTIFACT", default_value = DEFAULT_ARTIFACT)]
    pub output: PathBuf,
    #[arg(long, value_enum, default_value_t = TargetArg::Price)]
    pub target: TargetArg,
    #[arg(long, default_value_t = ForestParams::default().n_trees)]
    pub trees: usize,
    #[arg(long, default_value_t = ForestParams::default().max_depth)]
    pub max_depth: usize,
    #[arg(long, default_value_t = ForestParams::default().min_samples_split)]
    pub min_samples_split: usize,
    #[arg(long, default_value_t = ForestParams::default().min_samples_leaf)]
    pub min_samples_leaf: usize,
    /// Fraction of columns tried at each split.
    #[arg(long, default_value_t = ForestParams::default().max_features)]
    pub max_features: f64,
    #[arg(long, default_value_t = ForestParams::default().seed)]
    pub seed: u64,
    #[arg(long, default_value_t = REFERENCE_YEAR)]
    pub reference_year: i32,
    #[arg(long, default_value = "cp932")]
    pub encoding: String,
    /// File-name substrings to skip. Replaces the defaults when given.
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,
    /// Score on this fraction of rows before the final fit.
    #[arg(long)]
    pub holdout: Option<f64>,
    /// Also write the sorted location labels as JSON.
    #[arg(long)]
    pub town_list: Option<PathBuf>,
    /// Leave walk minutes out of the model.
    #[arg(long)]
    pub no_walk: bool,
}

impl TrainArgs {
    pub fn into_config(self) -> Result<TrainConfig, TrainError> {
        let exclude_markers = if self.exclude.is_empty() {
            DEFAULT_EXCLUDE_MARKERS.iter().map(|s| s.to_string()).collect()
        } else {
            self.exclude
        };

        let forest = ForestParams {
            n_trees: self.trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            seed: self.seed,
        };
        forest.validate()?;

        Ok(TrainConfig {
            inputs: self.inputs,
            output: self.output,
            town_list: self.town_list,
            loader: LoaderConfig {
                encoding: encoding_for_label(&self.encoding)?,
                exclude_markers,
                reference_year: self.reference_year,
            },
            fit: FitOptions {
                target: self.target.into(),
                forest,
                reference_year: self.reference_year,
                use_walk: !self.no_walk,
            },
            holdout: self.holdout,
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    #[arg(long, env = "ESTIMATOR_ARTIFACT", default_value = DEFAULT_ARTIFACT)]
    pub artifact: PathBuf,
    #[arg(long, env = "ESTIMATOR_TIER_FACTORS")]
    pub tier_factors: Option<PathBuf>,
    /// Location label, e.g. 東京都渋谷区神南1丁目.
    #[arg(long)]
    pub location: String,
    /// Floor area in m².
    #[arg(long)]
    pub area: f64,
    /// Construction year.
    #[arg(long)]
    pub year: i32,
    /// Minutes on foot to the nearest station.
    #[arg(long)]
    pub walk: Option<f64>,
    /// Print the estimate as JSON.
    #[arg(long)]
    pub json: bool,
}

impl EstimateArgs {
    pub fn input(&self) -> FeatureInput {
        FeatureInput {
            location: self.location.trim().to_string(),
            area: self.area,
            construction_year: self.year,
            walk_minutes: self.walk,
        }
    }
}
