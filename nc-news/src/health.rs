//! Health check handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    error::DatabaseOperation,
    state::AppState,
    store::{Statement, StoreExecutor},
};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Readiness check response with dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,

    /// Service name
    pub service: String,

    /// Dependency statuses
    pub dependencies: HashMap<String, DependencyStatus>,
}

/// Individual dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyStatus {
    /// Dependency is healthy
    pub healthy: bool,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn probe() -> Statement {
    Statement::new("SELECT 1 AS ok;")
}

/// Liveness probe
///
/// Always returns 200 OK if the service is running.
pub async fn health<S: StoreExecutor>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: state.config().service.name.clone(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness probe
///
/// Returns 503 Service Unavailable when the store does not answer a trivial
/// query within the query timeout.
pub async fn readiness<S: StoreExecutor>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let mut dependencies = HashMap::new();

    let ready = match state.fetch(DatabaseOperation::Query, &probe()).await {
        Ok(_) => {
            dependencies.insert(
                "database".to_string(),
                DependencyStatus {
                    healthy: true,
                    message: Some("Connected".to_string()),
                },
            );
            true
        }
        Err(e) => {
            tracing::error!(kind = %e.kind, "Database health check failed: {}", e.message);
            dependencies.insert(
                "database".to_string(),
                DependencyStatus {
                    healthy: false,
                    message: Some(format!("Query failed: {}", e.kind)),
                },
            );
            false
        }
    };

    let response = ReadinessResponse {
        ready,
        service: state.config().service.name.clone(),
        dependencies,
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
