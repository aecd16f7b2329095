pub mod estimator;

pub use estimator::{estimate_result, estimator_page, location_options, EstimatorVm, FormValues};
