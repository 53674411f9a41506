//! `GET /api` and the catch-all 404

use axum::{http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::{Error, ErrorResponse, Result};

const ENDPOINTS_JSON: &str = include_str!("../../endpoints.json");

static ENDPOINTS: Lazy<std::result::Result<Value, String>> =
    Lazy::new(|| serde_json::from_str(ENDPOINTS_JSON).map_err(|e| e.to_string()));

/// JSON description of every endpoint
pub async fn get_endpoints() -> Result<Json<Value>> {
    match &*ENDPOINTS {
        Ok(endpoints) => Ok(Json(endpoints.clone())),
        Err(e) => Err(Error::Internal(format!("endpoints.json is invalid: {}", e))),
    }
}

/// Fallback for unknown paths
pub async fn page_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::page_not_found()))
}
