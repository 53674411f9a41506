//! `/api/topics` handlers

use axum::{extract::State, Json};

use crate::error::Result;
use crate::models::{topic, Topic};
use crate::state::AppState;
use crate::store::StoreExecutor;

/// Bare array of `{slug, description}`
pub async fn get_topics<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Topic>>> {
    Ok(Json(topic::fetch_topics(&state).await?))
}
