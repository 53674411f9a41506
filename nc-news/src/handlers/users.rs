//! `/api/users` handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::user;
use crate::state::AppState;
use crate::store::StoreExecutor;

pub async fn get_users<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Value>> {
    let users = user::fetch_users(&state).await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn get_user<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    let found = user::fetch_user(&state, &username).await?;
    Ok(Json(json!({ "user": found })))
}
