//! # nc-news
//!
//! News and discussion REST API over PostgreSQL: topics, articles, comments
//! and users, with a filterable, sortable and paginated article listing.
//!
//! ## Layout
//!
//! - [`listing`]: the article listing core. Validates request parameters
//!   against allow-lists, renders parameterized SQL and pages the results.
//! - [`store`]: the [`StoreExecutor`](store::StoreExecutor) seam every query
//!   goes through, with [`database::PgStore`] as the PostgreSQL implementation.
//! - [`handlers`] and [`routes`]: the axum surface under `/api`.
//! - [`seed`]: schema creation and data seeding for development and tests.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nc_news::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::connect(config.clone()).await?;
//!
//!     Server::new(config).serve(router(state)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod responses;
pub mod routes;
pub mod seed;
pub mod server;
pub mod state;
pub mod store;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, MiddlewareConfig, RequestTrackingConfig};
    pub use crate::database::{create_pool, PgStore};
    pub use crate::error::{
        DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, ErrorResponse, Result,
    };
    pub use crate::health::{health, readiness};
    pub use crate::ids::{MakeTypedRequestId, RequestId, RequestIdError};
    pub use crate::listing::{
        ListingError, ListingErrorKind, ListingQuery, ListingResult, ListingService,
    };
    pub use crate::middleware::{
        request_id_layer, request_id_propagation_layer, sensitive_headers_layer,
        REQUEST_ID_HEADER, SENSITIVE_HEADERS,
    };
    pub use crate::models::{Article, Comment, NewArticle, NewComment, Topic, User, VoteUpdate};
    pub use crate::observability::init_tracing;
    pub use crate::responses::{Created, NoContent};
    pub use crate::routes::router;
    pub use crate::seed::SeedData;
    pub use crate::server::Server;
    pub use crate::state::AppState;
    pub use crate::store::{BindValue, Rows, Statement, StoreExecutor};

    pub use axum::{
        extract::{Path, Query, State},
        routing::{delete, get, patch, post},
        Json, Router,
    };
    pub use serde::{Deserialize, Serialize};
}
