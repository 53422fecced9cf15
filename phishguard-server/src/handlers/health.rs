//! Service info and health check handlers

use axum::{extract::State, Json};
use phishguard_core::model::ModelMetadata;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct ModelSummary {
    #[serde(rename = "type")]
    model_type: String,
    features: usize,
    accuracy: Option<f64>,
}

#[derive(Serialize)]
pub struct HomeResponse {
    message: &'static str,
    status: &'static str,
    model: ModelSummary,
    database: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    model_type: String,
    features_count: usize,
    database_connected: bool,
    model: ModelMetadata,
    version: &'static str,
    timestamp: String,
}

pub async fn home(State(state): State<AppState>) -> Json<HomeResponse> {
    let model = state.engine.model();
    Json(HomeResponse {
        message: "Phishing Detection API",
        status: "online",
        model: ModelSummary {
            model_type: model.model_type().to_string(),
            features: model.schema().len(),
            accuracy: model.accuracy(),
        },
        database: if state.database_connected() { "connected" } else { "disconnected" },
    })
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.engine.model();
    Json(HealthResponse {
        status: "healthy",
        // The server does not start without a model
        model_loaded: true,
        model_type: model.model_type().to_string(),
        features_count: model.schema().len(),
        database_connected: state.database_connected(),
        model: model.metadata().clone(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
