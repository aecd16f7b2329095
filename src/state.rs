// state.rs
use crate::errors::ServerError;
use crate::estimator::{Estimator, TierFactors};
use std::path::Path;

/// What every request handler gets: the loaded estimator, or the reason it
/// could not be loaded. The server starts either way.
#[derive(Debug)]
pub struct AppState {
    model: Result<Estimator, String>,
}

impl AppState {
    pub fn ready(estimator: Estimator) -> Self {
        Self {
            model: Ok(estimator),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            model: Err(reason.into()),
        }
    }

    /// Load the artifact and optional tier factors. Failures are logged and
    /// kept so pages can show them.
    pub fn load(artifact: &Path, tier_factors: Option<&Path>) -> Self {
        let estimator = match Estimator::load(artifact) {
            Ok(e) => e,
            Err(e) => {
                log::error!("model unavailable: {e}");
                return Self::unavailable(e.to_string());
            }
        };

        let estimator = match tier_factors.map(TierFactors::load).transpose() {
            Ok(Some(factors)) => {
                log::info!("loaded {} tier factors", factors.len());
                estimator.with_tier_factors(factors)
            }
            Ok(None) => estimator,
            Err(e) => {
                log::error!("model unavailable: {e}");
                return Self::unavailable(e.to_string());
            }
        };

        let summary = estimator.summary();
        log::info!(
            "model loaded from {}: {} locations, {} trees, target {:?}",
            artifact.display(),
            summary.n_locations,
            summary.n_trees,
            summary.target
        );
        Self::ready(estimator)
    }

    pub fn estimator(&self) -> Result<&Estimator, ServerError> {
        self.model
            .as_ref()
            .map_err(|reason| ServerError::ModelUnavailable(reason.clone()))
    }
}
