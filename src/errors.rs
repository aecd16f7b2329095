// errors.rs
use crate::estimator::EstimateError;
use std::fmt;

/// Errors a route handler can end in. Library errors are folded into these
/// before they reach the response layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    /// Location label not present in the model.
    UnknownLocation(String),
    /// The artifact failed to load at startup; carries the load error.
    ModelUnavailable(String),
    EstimationFailed(String),
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) | ServerError::UnknownLocation(_) => 400,
            ServerError::ModelUnavailable(_) => 503,
            ServerError::EstimationFailed(_) | ServerError::InternalError => 500,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::UnknownLocation(loc) => write!(f, "No match for location {loc:?}"),
            ServerError::ModelUnavailable(msg) => write!(f, "Model unavailable: {msg}"),
            ServerError::EstimationFailed(msg) => write!(f, "Estimation failed: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<EstimateError> for ServerError {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::UnknownLocation(loc) => ServerError::UnknownLocation(loc),
            EstimateError::NonPositivePrediction(_) | EstimateError::Prediction(_) => {
                ServerError::EstimationFailed(err.to_string())
            }
            other => ServerError::BadRequest(other.to_string()),
        }
    }
}
