//! Shared setup for the PostgreSQL-backed tests
//!
//! Every test reseeds the same database, so tests take a process-wide lock
//! for their whole run. Without `DATABASE_URL` the setup returns `None` and
//! the test passes without doing anything.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use nc_news::prelude::*;
use nc_news::seed;
use once_cell::sync::Lazy;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use tower::ServiceExt;

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub struct TestApp {
    pub state: AppState,
    _guard: MutexGuard<'static, ()>,
}

/// Connect, reseed with the embedded test data and hand back the state
pub async fn setup() -> Option<TestApp> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL integration test");
        return None;
    };

    let guard = DB_LOCK.lock().await;

    let mut config = Config::default();
    config.database.url = url;
    config.database.max_connections = 4;
    config.database.max_retries = 1;
    config.database.retry_delay_secs = 1;

    let state = AppState::connect(config)
        .await
        .expect("test database must be reachable");
    let data = SeedData::test().expect("embedded seed data parses");
    seed::seed(state.store().pool(), &data)
        .await
        .expect("seeding the test database");

    Some(TestApp {
        state,
        _guard: guard,
    })
}

impl TestApp {
    /// Send `request` through the full route table
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(self.state.clone()).oneshot(request).await.unwrap();
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

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Run the listing service directly
    pub async fn list(
        &self,
        pairs: &[(&str, &str)],
    ) -> std::result::Result<ListingResult, ListingError> {
        let query = ListingQuery::from_pairs(pairs.iter().copied());
        self.state.listing().list_articles(&query).await
    }
}
