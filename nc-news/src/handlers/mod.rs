//! HTTP handlers for the `/api` routes
//!
//! Handlers are generic over the [`StoreExecutor`](crate::store::StoreExecutor)
//! carried in [`AppState`](crate::state::AppState). They parse path and body
//! input, call into [`crate::models`] or the listing service, and shape the
//! JSON envelope. Every failure is a [`crate::error::Error`].

pub mod articles;
pub mod comments;
pub mod endpoints;
pub mod topics;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::{Error, Result};

/// Parse a path id: a positive 32-bit integer
pub fn parse_id(raw: &str) -> Result<i32> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            tracing::debug!(id = raw, "Rejected path id");
            Err(Error::invalid_input())
        }
    }
}

/// Unwrap a JSON body, turning any rejection into invalid input
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected request body");
            Err(Error::invalid_input())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::{body::Body, http::Request, response::Response, Router};
    use serde_json::Value;
    use tower::ServiceExt;

    pub async fn send(app: Router, request: Request<Body>) -> (axum::http::StatusCode, Value) {
        let response: Response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}
