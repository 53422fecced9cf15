//! Manifest on disk → engine → recorder, through the public API only

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use phishguard_core::constants::DEFAULT_RECENT_WINDOW;
use phishguard_core::features::{ExtractionError, FeatureExtractor, DEFAULT_FEATURES};
use phishguard_core::{CheckRecorder, MemoryRecorder, ModelArtifact, PredictError, PredictionEngine};

/// Returns a canned vector per URL substring
struct LookupExtractor;

#[async_trait]
impl FeatureExtractor for LookupExtractor {
    async fn extract(&self, url: &str) -> Result<Vec<f64>, ExtractionError> {
        if url.contains("bad") {
            Ok(vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0])
        } else {
            Ok(vec![-1.0; 10])
        }
    }
}

fn write_manifest(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("phishing_model.json");
    std::fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn test_linear_manifest_classifies_and_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        dir.path(),
        r#"{
            "model_type": "LogisticRegression",
            "accuracy": 0.912,
            "scorer": {"kind": "linear", "weights": [1,1,1,1,1,1,1,1,1,1], "bias": 0.0}
        }"#,
    );

    let model = ModelArtifact::load(&path).unwrap();
    assert_eq!(model.model_type(), "LogisticRegression");
    assert_eq!(model.accuracy(), Some(0.912));
    assert!(model.supports_probabilities());
    assert_eq!(model.schema().names(), DEFAULT_FEATURES);

    let recorder = Arc::new(MemoryRecorder::new());
    let engine = PredictionEngine::new(Arc::new(LookupExtractor), Arc::new(model))
        .with_recorder(recorder.clone());

    let bad = engine.predict("http://bad.test/login", Some("analyst")).await.unwrap();
    assert_eq!(bad.prediction, "phishing");
    assert_eq!(bad.signals.len(), 10);
    assert_eq!(bad.user, "analyst");

    let good = engine.predict("https://good.test", None).await.unwrap();
    assert_eq!(good.prediction, "legitimate");
    assert!(good.signals.is_empty());
    assert_eq!(good.confidence, good.phishing_probability.map(|p| 100.0 - p));

    let stats = recorder.aggregate(DEFAULT_RECENT_WINDOW).await.unwrap();
    assert_eq!(stats.total_checks, 2);
    assert_eq!(stats.phishing_detected, 1);
    assert_eq!(stats.legitimate, 1);
    assert_eq!(stats.recent_24h, 2);
    assert_eq!(stats.phishing_rate, 50.0);
}

#[tokio::test]
async fn test_custom_schema_rejects_default_extractor_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        dir.path(),
        r#"{
            "features": ["having_IP_Address", "SSLfinal_State", "DNSRecord"],
            "scorer": {"kind": "linear", "weights": [1, 1, 1]}
        }"#,
    );

    let model = ModelArtifact::load(&path).unwrap();
    assert_eq!(model.model_type(), "Unknown");
    assert_eq!(model.accuracy(), None);

    let engine = PredictionEngine::new(Arc::new(LookupExtractor), Arc::new(model));
    let err = engine.predict("http://bad.test", None).await.unwrap_err();
    assert!(matches!(err, PredictError::SchemaMismatch { expected: 3, got: 10 }));
}
