//! Engine Module - the prediction pipeline
//!
//! Builds on `features` for the vector, `model` for scoring and
//! `recorder` for the optional persistence side effect.

pub mod types;
pub mod service;


// Re-export common types
pub use types::{PredictError, PredictionResult};
pub use service::{confidence_from, label_name, PredictionEngine};
