//! Feature schema handler

use axum::{extract::State, Json};
use phishguard_core::features::LayoutInfo;

use crate::AppState;

/// Names, count and layout hash of the loaded model's schema
pub async fn list(State(state): State<AppState>) -> Json<LayoutInfo> {
    Json(LayoutInfo::from(state.engine.model().schema()))
}
