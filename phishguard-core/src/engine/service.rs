//! Prediction Engine - extraction → validation → scoring → explanation
//!
//! Stateless per request. Every stage either hands a valid value to the
//! next one or ends the request; nothing is retried.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use super::types::{PredictError, PredictionResult};
use crate::constants::{ANONYMOUS_USER, LABEL_LEGITIMATE, LABEL_PHISHING, PHISHING_CLASS};
use crate::features::{FeatureExtractor, FeatureRow};
use crate::model::ModelArtifact;
use crate::recorder::{round2, CheckRecord, CheckRecorder};

pub struct PredictionEngine {
    extractor: Arc<dyn FeatureExtractor>,
    model: Arc<ModelArtifact>,
    recorder: Option<Arc<dyn CheckRecorder>>,
}

impl fmt::Debug for PredictionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("model", &self.model)
            .field("recorder", &self.recorder.as_ref().map(|r| r.name()))
            .finish()
    }
}

impl PredictionEngine {
    pub fn new(extractor: Arc<dyn FeatureExtractor>, model: Arc<ModelArtifact>) -> Self {
        Self {
            extractor,
            model,
            recorder: None,
        }
    }

    /// Attach a recorder that receives every successful check
    pub fn with_recorder(mut self, recorder: Arc<dyn CheckRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    pub fn recorder(&self) -> Option<&Arc<dyn CheckRecorder>> {
        self.recorder.as_ref()
    }

    /// Classify one URL on behalf of `requester`
    pub async fn predict(
        &self,
        url: &str,
        requester: Option<&str>,
    ) -> Result<PredictionResult, PredictError> {
        if url.trim().is_empty() {
            return Err(PredictError::MissingUrl);
        }

        log::info!("Scanning URL: {}", url);

        let values = self.extractor.extract(url).await.map_err(|e| {
            log::warn!("Feature extraction failed for {}: {}", url, e);
            PredictError::Extraction(e)
        })?;

        let schema = self.model.schema();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PredictError::InvalidFeatureFormat);
        }
        let row = schema.align(&values).map_err(|e| PredictError::SchemaMismatch {
            expected: e.expected,
            got: e.got,
        })?;

        let score = self.model.scorer().score(&row)?;
        let prediction = label_name(score.label);

        let (confidence, phishing_probability) = score
            .probabilities
            .as_deref()
            .map(confidence_from)
            .unwrap_or((None, None));

        let result = PredictionResult {
            url: url.to_string(),
            prediction: prediction.to_string(),
            confidence,
            phishing_probability,
            signals: row.signals(),
            checked_at: Utc::now(),
            user: requester.unwrap_or(ANONYMOUS_USER).to_string(),
        };

        self.record_best_effort(&result, &row).await;

        log::info!(
            "Result: {} ({} confidence)",
            result.prediction.to_uppercase(),
            result
                .confidence
                .map(|c| format!("{}%", c))
                .unwrap_or_else(|| "no".to_string())
        );

        Ok(result)
    }

    /// Persistence never changes the outcome of a prediction
    async fn record_best_effort(&self, result: &PredictionResult, row: &FeatureRow<'_>) {
        let Some(recorder) = &self.recorder else {
            return;
        };

        let record = CheckRecord {
            result: result.clone(),
            features: row.to_map(),
        };
        if let Err(e) = recorder.record(&record).await {
            log::warn!("Check insert via {} failed: {}", recorder.name(), e);
        }
    }
}

/// Class 1 is phishing; every other label is legitimate
pub fn label_name(label: i64) -> &'static str {
    if label == PHISHING_CLASS {
        LABEL_PHISHING
    } else {
        LABEL_LEGITIMATE
    }
}

/// Confidence and phishing probability, both percentages rounded to 2 places
pub fn confidence_from(proba: &[f64]) -> (Option<f64>, Option<f64>) {
    let confidence = proba
        .iter()
        .copied()
        .fold(None, |max: Option<f64>, p| Some(max.map_or(p, |m| m.max(p))))
        .map(|p| round2(p * 100.0));

    let phishing = if proba.len() > 1 {
        Some(round2(proba[PHISHING_CLASS as usize] * 100.0))
    } else {
        None
    };

    (confidence, phishing)
}
