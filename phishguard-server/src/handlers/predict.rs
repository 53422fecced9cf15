//! URL prediction handler

use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use phishguard_core::PredictionResult;

use crate::{AppResult, AppState};

/// `POST /predict` body. Anything that does not parse is treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub user: Option<Value>,
}

impl PredictRequest {
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Only string URLs are accepted
    pub fn url(&self) -> &str {
        match &self.url {
            Some(Value::String(url)) => url,
            _ => "",
        }
    }

    /// Requester id as text; `null` counts as absent
    pub fn user(&self) -> Option<String> {
        match &self.user {
            None | Some(Value::Null) => None,
            Some(Value::String(user)) => Some(user.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<PredictionResult>> {
    let request = PredictRequest::parse(&body);
    let user = request.user();

    let result = state.engine.predict(request.url(), user.as_deref()).await?;
    Ok(Json(result))
}
