//! `/api/comments` handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use super::{json_body, parse_id};
use crate::error::Result;
use crate::models::{comment, VoteUpdate};
use crate::responses::NoContent;
use crate::state::AppState;
use crate::store::StoreExecutor;

pub async fn delete_comment<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
    Path(comment_id): Path<String>,
) -> Result<NoContent> {
    let comment_id = parse_id(&comment_id)?;
    comment::remove_comment(&state, comment_id).await?;
    tracing::info!(comment_id, "Comment deleted");
    Ok(NoContent)
}

pub async fn patch_comment<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
    Path(comment_id): Path<String>,
    payload: std::result::Result<Json<VoteUpdate>, JsonRejection>,
) -> Result<Json<Value>> {
    let comment_id = parse_id(&comment_id)?;
    let inc_votes = json_body(payload)?.validate()?;
    let updated = comment::add_votes(&state, comment_id, inc_votes).await?;
    Ok(Json(json!({ "comment": updated })))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::handlers::testing::{send, with_json};
    use crate::routes::router;
    use crate::state::AppState;
    use crate::store::testing::ScriptedStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_delete_comment() {
        let state = AppState::new(
            Config::default(),
            ScriptedStore::new().respond(vec![json!({"comment_id": 1})]),
        );
        let (status, body) = send(router(state), delete("/api/comments/1")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_delete_comment_errors() {
        let state = AppState::new(Config::default(), ScriptedStore::new().respond(vec![]));
        let (status, _) = send(router(state), delete("/api/comments/1000")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let state = AppState::new(Config::default(), ScriptedStore::new());
        let (status, _) = send(router(state), delete("/api/comments/not-an-id")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_comment() {
        let state = AppState::new(
            Config::default(),
            ScriptedStore::new().respond(vec![json!({
                "comment_id": 1,
                "votes": 15,
                "created_at": "2020-04-06T12:17:00Z",
                "author": "butter_bridge",
                "body": "Oh, I've got compassion running out of my nose, pal! I'm the Sultan of Sentiment!",
                "article_id": 9
            })]),
        );
        let (status, body) = send(
            router(state),
            with_json("PATCH", "/api/comments/1", json!({"inc_votes": -1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["comment"]["votes"], 15);
    }

    #[tokio::test]
    async fn test_patch_missing_comment() {
        let state = AppState::new(Config::default(), ScriptedStore::new().respond(vec![]));
        let (status, _) = send(
            router(state),
            with_json("PATCH", "/api/comments/999", json!({"inc_votes": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
