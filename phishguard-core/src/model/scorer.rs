//! Scorer trait and model errors

use thiserror::Error;

use crate::features::{FeatureRow, SchemaError};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("invalid feature schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    Checksum {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("accuracy must be within [0, 1], got {0}")]
    InvalidAccuracy(f64),

    #[error("scorer expects {expected} weights for the schema, got {got}")]
    WeightCount { expected: usize, got: usize },

    #[error("ONNX runtime error: {0}")]
    Onnx(String),

    #[error("invalid scorer input: {0}")]
    Input(String),

    #[error("scorer does not provide class probabilities")]
    ProbabilitiesUnsupported,
}

// ============================================================================
// SCORER TRAIT
// ============================================================================

/// Label plus, when the backend has them, per-class probabilities
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub label: i64,
    pub probabilities: Option<Vec<f64>>,
}

/// Common interface over every classifier backend.
///
/// Implementations must be safe to call from concurrent requests.
pub trait Scorer: Send + Sync {
    /// Class label for one aligned row
    fn predict(&self, row: &FeatureRow<'_>) -> Result<i64, ModelError>;

    /// Per-class probabilities, indexed by class label
    fn predict_proba(&self, row: &FeatureRow<'_>) -> Result<Vec<f64>, ModelError>;

    /// Fixed at construction; `predict_proba` fails when this is false
    fn supports_probabilities(&self) -> bool;

    /// Short backend name for logs and status
    fn backend(&self) -> &'static str;

    /// Label and probabilities in one pass.
    ///
    /// Backends that evaluate both outputs together should override this.
    fn score(&self, row: &FeatureRow<'_>) -> Result<Score, ModelError> {
        let label = self.predict(row)?;
        let probabilities = if self.supports_probabilities() {
            Some(self.predict_proba(row)?)
        } else {
            None
        };
        Ok(Score { label, probabilities })
    }
}
