//! `/api/articles` handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde_json::{json, Value};

use super::{json_body, parse_id};
use crate::error::{Error, Result};
use crate::listing::{ListingQuery, ListingResult};
use crate::models::{article, comment, NewArticle, NewComment, VoteUpdate};
use crate::responses::Created;
use crate::state::AppState;
use crate::store::StoreExecutor;

/// `GET /api/articles?topic=&author=&sort_by=&order_by=&page=&limit=`
pub async fn get_articles<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
    params: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ListingResult>> {
    let Query(params) = params.map_err(|e| {
        tracing::debug!(error = %e, "Rejected query string");
        Error::invalid_input()
    })?;
    let query = ListingQuery::from_pairs(params);
    let result = state.listing().list_articles(&query).await?;
    Ok(Json(result))
}

pub async fn post_article<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
    payload: std::result::Result<Json<NewArticle>, JsonRejection>,
) -> Result<Created<Value>> {
    let new_article = json_body(payload)?;
    let created = article::create_article(&state, new_article).await?;
    tracing::info!(article_id = created.article_id, "Article created");
    let location = format!("/api/articles/{}", created.article_id);
    Ok(Created::new(json!({ "article": created })).with_location(location))
}

pub async fn get_article<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
    Path(article_id): Path<String>,
) -> Result<Json<Value>> {
    let article_id = parse_id(&article_id)?;
    let found = article::fetch_article(&state, article_id).await?;
    Ok(Json(json!({ "article": found })))
}

pub async fn patch_article<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
    Path(article_id): Path<String>,
    payload: std::result::Result<Json<VoteUpdate>, JsonRejection>,
) -> Result<Json<Value>> {
    let article_id = parse_id(&article_id)?;
    let inc_votes = json_body(payload)?.validate()?;
    let updated = article::add_votes(&state, article_id, inc_votes).await?;
    Ok(Json(json!({ "article": updated })))
}

pub async fn get_article_comments<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
    Path(article_id): Path<String>,
) -> Result<Json<Value>> {
    let article_id = parse_id(&article_id)?;
    let comments = comment::fetch_for_article(&state, article_id).await?;
    Ok(Json(json!({ "comments": comments })))
}

pub async fn post_article_comment<S: StoreExecutor + 'static>(
    State(state): State<AppState<S>>,
    Path(article_id): Path<String>,
    payload: std::result::Result<Json<NewComment>, JsonRejection>,
) -> Result<Created<Value>> {
    let article_id = parse_id(&article_id)?;
    let new_comment = json_body(payload)?;
    let created = comment::create_comment(&state, article_id, new_comment).await?;
    tracing::info!(article_id, comment_id = created.comment_id, "Comment posted");
    let location = format!("/api/comments/{}", created.comment_id);
    Ok(Created::new(json!({ "comment": created })).with_location(location))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation};
    use crate::handlers::testing::{get, send, with_json};
    use crate::routes::router;
    use crate::state::AppState;
    use crate::store::testing::ScriptedStore;
    use crate::store::BindValue;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn article(id: i64) -> Value {
        json!({
            "article_id": id,
            "title": "Living in the shadow of a great man",
            "topic": "mitch",
            "author": "butter_bridge",
            "body": "I find this existence challenging",
            "created_at": "2020-07-09T20:11:00Z",
            "votes": 100,
            "article_img_url": "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700",
            "comment_count": 11
        })
    }

    fn scripted_app(store: ScriptedStore) -> (axum::Router, AppState<ScriptedStore>) {
        let state = AppState::new(Config::default(), store);
        (router(state.clone()), state)
    }

    #[tokio::test]
    async fn test_list_articles_envelope() {
        let (app, state) = scripted_app(
            ScriptedStore::new()
                .respond_count(12)
                .respond(vec![article(1), article(2)]),
        );
        let (status, body) = send(app, get("/api/articles?topic=mitch&limit=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 12);
        assert_eq!(body["articles"].as_array().unwrap().len(), 2);
        assert_eq!(body["articles"][0]["comment_count"], 11);

        let statements = state.store().statements();
        assert_eq!(statements[1].binds()[0], BindValue::Text("mitch".into()));
    }

    #[tokio::test]
    async fn test_list_articles_repeated_key_last_wins() {
        let (app, state) =
            scripted_app(ScriptedStore::new().respond_count(1).respond(vec![article(5)]));
        let (status, _) = send(app, get("/api/articles?topic=cats&topic=mitch")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            state.store().statements()[0].binds(),
            &[BindValue::Text("mitch".into())]
        );
    }

    #[tokio::test]
    async fn test_list_articles_failures() {
        let cases = [
            ("/api/articles?sort_by=invalidColumn", StatusCode::BAD_REQUEST),
            ("/api/articles?page=two", StatusCode::BAD_REQUEST),
            ("/api/articles?colour=red", StatusCode::BAD_REQUEST),
        ];
        for (uri, expected) in cases {
            let (app, _) = scripted_app(ScriptedStore::new());
            let (status, body) = send(app, get(uri)).await;
            assert_eq!(status, expected, "{uri}");
            assert_eq!(body["errorMessage"], "Invalid input: incorrect data format.");
        }

        let (app, _) = scripted_app(ScriptedStore::new().respond_count(0));
        let (status, body) = send(app, get("/api/articles?topic=nonexistent-topic")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorMessage"], "Uh oh! Looks like there's nothing to see here..");
    }

    #[tokio::test]
    async fn test_list_articles_store_timeout_is_503() {
        let mut config = Config::default();
        config.database.query_timeout_ms = 20;
        let state = AppState::new(
            config,
            ScriptedStore::new()
                .with_delay(std::time::Duration::from_millis(500))
                .respond_count(1),
        );
        let (status, _) = send(router(state), get("/api/articles")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_get_article() {
        let (app, state) = scripted_app(ScriptedStore::new().respond(vec![article(1)]));
        let (status, body) = send(app, get("/api/articles/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["article"]["article_id"], 1);
        assert_eq!(body["article"]["created_at"], "2020-07-09T20:11:00Z");
        assert_eq!(state.store().statements()[0].binds(), &[BindValue::Integer(1)]);
    }

    #[tokio::test]
    async fn test_get_article_errors() {
        let (app, _) = scripted_app(ScriptedStore::new().respond(vec![]));
        let (status, body) = send(app, get("/api/articles/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["errorMessage"],
            "Sorry! We weren't able to find what you were looking for."
        );

        let (app, state) = scripted_app(ScriptedStore::new());
        let (status, _) = send(app, get("/api/articles/banana")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.store().statements().is_empty());
    }

    #[tokio::test]
    async fn test_patch_article_votes() {
        let mut updated = article(1);
        updated["votes"] = json!(110);
        let (app, state) = scripted_app(ScriptedStore::new().respond(vec![updated]));
        let (status, body) = send(
            app,
            with_json("PATCH", "/api/articles/1", json!({"inc_votes": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["article"]["votes"], 110);
        assert_eq!(
            state.store().statements()[0].binds(),
            &[BindValue::Integer(10), BindValue::Integer(1)]
        );
    }

    #[tokio::test]
    async fn test_patch_article_rejects_bad_bodies() {
        for body in [json!({}), json!({"inc_votes": "ten"}), json!({"inc_votes": 0})] {
            let (app, state) = scripted_app(ScriptedStore::new());
            let (status, _) = send(app, with_json("PATCH", "/api/articles/1", body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(state.store().statements().is_empty());
        }
    }

    #[tokio::test]
    async fn test_post_article() {
        let mut created = article(14);
        created["comment_count"] = json!(0);
        let (app, state) = scripted_app(ScriptedStore::new().respond(vec![created]));
        let (status, body) = send(
            app,
            with_json(
                "POST",
                "/api/articles",
                json!({
                    "author": "butter_bridge",
                    "title": "Living in the shadow of a great man",
                    "body": "I find this existence challenging",
                    "topic": "mitch"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["article"]["comment_count"], 0);
        assert_eq!(
            state.store().statements()[0].binds()[4],
            BindValue::Text(crate::models::DEFAULT_ARTICLE_IMG_URL.into())
        );
    }

    #[tokio::test]
    async fn test_post_article_unknown_topic_is_404() {
        let (app, _) = scripted_app(ScriptedStore::new().fail(DatabaseError::with_context(
            DatabaseOperation::Insert,
            DatabaseErrorKind::ReferenceNotFound,
            "insert or update on table \"articles\" violates foreign key constraint",
            "sqlstate 23503",
        )));
        let (status, _) = send(
            app,
            with_json(
                "POST",
                "/api/articles",
                json!({"author": "lurker", "title": "t", "body": "b", "topic": "dogs"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_article_comments() {
        let (app, _) = scripted_app(
            ScriptedStore::new()
                .respond(vec![json!({"article_id": 3})])
                .respond(vec![json!({
                    "comment_id": 10,
                    "votes": 0,
                    "created_at": "2020-06-20T07:24:00Z",
                    "author": "icellusedkars",
                    "body": "git push origin master",
                    "article_id": 3
                })]),
        );
        let (status, body) = send(app, get("/api/articles/3/comments")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["comments"][0]["comment_id"], 10);
    }

    #[tokio::test]
    async fn test_post_comment() {
        let store = ScriptedStore::new().respond(vec![json!({
            "comment_id": 19,
            "votes": 0,
            "created_at": "2024-01-01T00:00:00Z",
            "author": "lurker",
            "body": "Nice",
            "article_id": 2
        })]);
        let state = AppState::new(Config::default(), store);
        let (status, body) = send(
            router(state.clone()),
            with_json(
                "POST",
                "/api/articles/2/comments",
                json!({"username": "lurker", "body": "Nice"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["comment"]["author"], "lurker");
        assert_eq!(state.store().statements().len(), 1);
    }

    #[tokio::test]
    async fn test_post_comment_missing_field() {
        let (app, _) = scripted_app(ScriptedStore::new());
        let (status, _) = send(
            app,
            with_json("POST", "/api/articles/2/comments", json!({"username": "lurker"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
