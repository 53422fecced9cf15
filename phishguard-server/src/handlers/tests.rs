//! Router tests against stub extractors and recorders

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use phishguard_core::features::{ExtractionError, FeatureExtractor};
use phishguard_core::model::LinearScorer;
use phishguard_core::recorder::{CheckRecord, CheckRecorder, CheckStats, MemoryRecorder, RecorderError};
use phishguard_core::{ModelArtifact, PredictionEngine};

use crate::config::Config;
use crate::{create_router, AppState};

struct FixedExtractor(Vec<f64>);

#[async_trait]
impl FeatureExtractor for FixedExtractor {
    async fn extract(&self, _url: &str) -> Result<Vec<f64>, ExtractionError> {
        Ok(self.0.clone())
    }
}

struct DownRecorder;

#[async_trait]
impl CheckRecorder for DownRecorder {
    async fn record(&self, _record: &CheckRecord) -> Result<(), RecorderError> {
        Err(RecorderError::Storage("connection reset".to_string()))
    }

    async fn aggregate(&self, _window: Duration) -> Result<CheckStats, RecorderError> {
        Err(RecorderError::Storage("connection reset".to_string()))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

fn test_config() -> Config {
    Config {
        model_path: PathBuf::from("models/test.json"),
        database_url: None,
        allowed_origins: None,
        port: 0,
        extractor_timeout: Duration::from_secs(1),
    }
}

fn phishing_vector() -> Vec<f64> {
    vec![1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
}

fn engine(values: Vec<f64>) -> PredictionEngine {
    let scorer = LinearScorer::new(vec![1.5; 10], -1.0, 0.5).unwrap();
    let model = ModelArtifact::from_parts(
        Box::new(scorer),
        None,
        Some("LogisticRegression".to_string()),
        Some(0.93),
    )
    .unwrap();
    PredictionEngine::new(Arc::new(FixedExtractor(values)), Arc::new(model))
}

fn app(engine: PredictionEngine) -> axum::Router {
    create_router(AppState {
        engine: Arc::new(engine),
        config: test_config(),
    })
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_predict(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn test_home_reports_model_and_database() {
    let (status, body) = send(app(engine(phishing_vector())), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Phishing Detection API");
    assert_eq!(body["status"], "online");
    assert_eq!(body["model"]["type"], "LogisticRegression");
    assert_eq!(body["model"]["features"], 10);
    assert_eq!(body["model"]["accuracy"], 0.93);
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_health() {
    let engine = engine(phishing_vector()).with_recorder(Arc::new(MemoryRecorder::new()));
    let (status, body) = send(app(engine), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["features_count"], 10);
    assert_eq!(body["database_connected"], true);
    assert_eq!(body["model"]["backend"], "linear");
    assert_eq!(body["model"]["model_type"], "LogisticRegression");
    assert_eq!(body["model"]["source"], "<memory>");
    assert!(body["model"]["loaded_at"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_features_lists_schema() {
    let (status, body) = send(app(engine(phishing_vector())), get("/features")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 10);
    assert_eq!(body["features"][0], "having_IP_Address");
    assert_eq!(body["features"][9], "DNSRecord");
    assert!(body["layout_hash"].is_u64());
}

#[tokio::test]
async fn test_stats_without_database() {
    let (status, body) = send(app(engine(phishing_vector())), get("/stats")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Database not connected");
}

#[tokio::test]
async fn test_stats_query_failure() {
    let engine = engine(phishing_vector()).with_recorder(Arc::new(DownRecorder));
    let (status, body) = send(app(engine), get("/stats")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn test_stats_after_checks() {
    let recorder = Arc::new(MemoryRecorder::new());
    let router = app(engine(phishing_vector()).with_recorder(recorder.clone()));

    for _ in 0..2 {
        let (status, _) = send(router.clone(), post_predict(r#"{"url":"http://10.0.0.1/"}"#)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(router, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_checks"], 2);
    assert_eq!(body["phishing_detected"], 2);
    assert_eq!(body["legitimate"], 0);
    assert_eq!(body["recent_24h"], 2);
    assert_eq!(body["phishing_rate"], 100.0);
}

#[tokio::test]
async fn test_predict_missing_url() {
    for body in [r#"{}"#, r#"{"url":""}"#, r#"{"url":null}"#, r#"{"url":42}"#, "not json", ""] {
        let (status, json) = send(app(engine(phishing_vector())), post_predict(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json["error"], "No URL provided");
    }
}

#[tokio::test]
async fn test_predict_phishing() {
    let body = json!({"url": "http://10.0.0.1/login", "user": "u-17"}).to_string();
    let (status, json) = send(app(engine(phishing_vector())), post_predict(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["url"], "http://10.0.0.1/login");
    assert_eq!(json["prediction"], "phishing");
    assert_eq!(json["signals"], json!(["having_IP_Address", "SSLfinal_State"]));
    assert_eq!(json["user"], "u-17");
    assert!(json["confidence"].is_f64());
    assert!(json["phishingProbability"].is_f64());
    assert!(json["checkedAt"].is_string());
}

#[tokio::test]
async fn test_predict_numeric_user_is_stringified() {
    let body = json!({"url": "http://10.0.0.1/", "user": 42}).to_string();
    let (_, json) = send(app(engine(phishing_vector())), post_predict(body)).await;
    assert_eq!(json["user"], "42");

    let body = json!({"url": "http://10.0.0.1/", "user": null}).to_string();
    let (_, json) = send(app(engine(phishing_vector())), post_predict(body)).await;
    assert_eq!(json["user"], "anonymous");
}

#[tokio::test]
async fn test_predict_echoes_url_and_empty_user_verbatim() {
    let body = json!({"url": " http://10.0.0.1/ ", "user": ""}).to_string();
    let (status, json) = send(app(engine(phishing_vector())), post_predict(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["url"], " http://10.0.0.1/ ");
    assert_eq!(json["user"], "");
}

#[tokio::test]
async fn test_predict_length_mismatch() {
    let (status, json) = send(
        app(engine(vec![0.0; 9])),
        post_predict(r#"{"url":"http://example.com"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Feature length mismatch");
    assert_eq!(json["expected"], 10);
    assert_eq!(json["got"], 9);
}

#[tokio::test]
async fn test_predict_invalid_feature_format() {
    let mut values = phishing_vector();
    values[0] = f64::INFINITY;
    let (status, json) = send(app(engine(values)), post_predict(r#"{"url":"http://example.com"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Invalid feature format");
}

#[tokio::test]
async fn test_predict_same_response_when_recording_fails() {
    let body = r#"{"url":"http://10.0.0.1/","user":"ops"}"#;

    let recorder = Arc::new(MemoryRecorder::new());
    let (ok_status, mut ok_json) = send(
        app(engine(phishing_vector()).with_recorder(recorder.clone())),
        post_predict(body),
    )
    .await;
    let (down_status, mut down_json) = send(
        app(engine(phishing_vector()).with_recorder(Arc::new(DownRecorder))),
        post_predict(body),
    )
    .await;

    assert_eq!(ok_status, StatusCode::OK);
    assert_eq!(down_status, StatusCode::OK);
    assert_eq!(recorder.len(), 1);

    // Only the timestamp may differ
    ok_json.as_object_mut().unwrap().remove("checkedAt");
    down_json.as_object_mut().unwrap().remove("checkedAt");
    assert_eq!(ok_json, down_json);
}
