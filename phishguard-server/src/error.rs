//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use phishguard_core::{PredictError, RecorderError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request errors
    MissingUrl,

    // Pipeline errors
    Prediction(PredictError),

    // Storage errors
    DatabaseNotConnected,
    DatabaseError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, extra) = match &self {
            AppError::MissingUrl => (StatusCode::BAD_REQUEST, "No URL provided".to_string(), None),
            AppError::Prediction(err) => {
                tracing::error!("Prediction error: {}", err);
                let extra = match err {
                    PredictError::SchemaMismatch { expected, got } => {
                        Some((*expected, *got))
                    }
                    _ => None,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), extra)
            }
            AppError::DatabaseNotConnected => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Database not connected".to_string(),
                None,
            ),
            AppError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None)
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let Some((expected, got)) = extra {
            body["expected"] = json!(expected);
            body["got"] = json!(got);
        }

        (status, Json(body)).into_response()
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::MissingUrl => AppError::MissingUrl,
            other => AppError::Prediction(other),
        }
    }
}

impl From<RecorderError> for AppError {
    fn from(err: RecorderError) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
