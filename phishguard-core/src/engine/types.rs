//! Prediction result and error types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::ExtractionError;
use crate::model::ModelError;

/// Outcome of one URL check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub url: String,
    /// `"phishing"` or `"legitimate"`
    pub prediction: String,
    /// Highest class probability, percent
    pub confidence: Option<f64>,
    /// Probability of class 1, percent
    pub phishing_probability: Option<f64>,
    /// Schema names whose value is 1
    pub signals: Vec<String>,
    pub checked_at: DateTime<Utc>,
    pub user: String,
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("No URL provided")]
    MissingUrl,

    #[error("Feature extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Invalid feature format")]
    InvalidFeatureFormat,

    #[error("Feature length mismatch")]
    SchemaMismatch { expected: usize, got: usize },

    #[error("Prediction failed: {0}")]
    Scoring(#[from] ModelError),
}

impl PredictError {
    /// Rejected before any scoring work; the caller sent something unusable
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::MissingUrl)
    }
}
