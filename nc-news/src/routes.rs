//! Route table

use axum::{
    routing::{get, patch},
    Router,
};

use crate::{
    handlers::{articles, comments, endpoints, topics, users},
    health::{health, readiness},
    state::AppState,
    store::StoreExecutor,
};

/// Every `/api` route plus the health probes, with the 404 fallback
pub fn router<S: StoreExecutor + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api", get(endpoints::get_endpoints))
        .route("/api/topics", get(topics::get_topics::<S>))
        .route(
            "/api/articles",
            get(articles::get_articles::<S>).post(articles::post_article::<S>),
        )
        .route(
            "/api/articles/{article_id}",
            get(articles::get_article::<S>).patch(articles::patch_article::<S>),
        )
        .route(
            "/api/articles/{article_id}/comments",
            get(articles::get_article_comments::<S>).post(articles::post_article_comment::<S>),
        )
        .route(
            "/api/comments/{comment_id}",
            patch(comments::patch_comment::<S>).delete(comments::delete_comment::<S>),
        )
        .route("/api/users", get(users::get_users::<S>))
        .route("/api/users/{username}", get(users::get_user::<S>))
        .route("/health", get(health::<S>))
        .route("/ready", get(readiness::<S>))
        .fallback(endpoints::page_not_found)
        .with_state(state)
}
