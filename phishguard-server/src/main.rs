//! PhishGuard API Server
//!
//! Serves URL phishing predictions over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PHISHGUARD API                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │  API      │  │  Prediction      │  │  Model          │  │
//! │  │  (Axum)   │─▶│  Engine (core)   │─▶│  Artifact       │  │
//! │  └───────────┘  └────────┬─────────┘  └─────────────────┘  │
//! │                          ▼ best effort                      │
//! │                   ┌─────────────┐                           │
//! │                   │ PostgreSQL  │ (optional)                │
//! │                   └─────────────┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod models;
mod handlers;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    http::{header, HeaderValue, Method},
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard_core::features::{ExtractorConfig, UrlFeatureExtractor};
use phishguard_core::{ModelArtifact, PredictionEngine};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "phishguard_server=debug,phishguard_core=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();

    tracing::info!("PhishGuard API starting...");

    // Model is mandatory
    let model = ModelArtifact::load(&config.model_path)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?;

    let extractor = UrlFeatureExtractor::new(ExtractorConfig {
        timeout: config.extractor_timeout,
        ..ExtractorConfig::default()
    })
    .context("Failed to build feature extractor")?;

    let mut engine = PredictionEngine::new(Arc::new(extractor), Arc::new(model));

    // Database is optional
    match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!("Database: {}", config.database_host().unwrap_or("***"));
            if let Some(pool) = db::connect(url).await {
                engine = engine.with_recorder(Arc::new(db::PgCheckRecorder::new(pool)));
                tracing::info!("Check persistence enabled");
            }
        }
        None => tracing::warn!("DATABASE_URL not set, check persistence disabled"),
    }

    // Build application state
    let state = AppState {
        engine: Arc::new(engine),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PredictionEngine>,
    pub config: config::Config,
}

impl AppState {
    pub fn database_connected(&self) -> bool {
        self.engine.recorder().is_some()
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.allowed_origins.as_deref());

    Router::new()
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::check))
        .route("/features", get(handlers::features::list))
        .route("/stats", get(handlers::stats::get))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin without credentials, or an explicit list with credentials
fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
