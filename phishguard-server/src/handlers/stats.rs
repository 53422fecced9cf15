//! Check statistics handler

use axum::{extract::State, Json};
use phishguard_core::constants::DEFAULT_RECENT_WINDOW;
use phishguard_core::CheckStats;

use crate::{AppError, AppResult, AppState};

pub async fn get(State(state): State<AppState>) -> AppResult<Json<CheckStats>> {
    let recorder = state
        .engine
        .recorder()
        .ok_or(AppError::DatabaseNotConnected)?;

    let stats = recorder.aggregate(DEFAULT_RECENT_WINDOW).await?;
    Ok(Json(stats))
}
