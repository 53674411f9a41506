use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{article, required_text};
use crate::error::{DatabaseOperation, Error, Result};
use crate::state::AppState;
use crate::store::{Statement, StoreExecutor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: i32,
    pub votes: i32,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub body: String,
    pub article_id: i32,
}

/// Body of `POST /api/articles/{article_id}/comments`
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub username: String,
    pub body: String,
}

const COMMENT_COLUMNS: &str = "comment_id, votes, created_at, author, body, article_id";

pub fn select_for_article(article_id: i32) -> Statement {
    Statement::new(format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE article_id = "))
        .bind(article_id)
        .then(" ORDER BY created_at DESC, comment_id DESC;")
}

pub fn insert(article_id: i32, username: &str, body: &str) -> Statement {
    Statement::new("INSERT INTO comments (author, body, article_id) VALUES (")
        .bind(username)
        .then(", ")
        .bind(body)
        .then(", ")
        .bind(article_id)
        .then(&format!(") RETURNING {COMMENT_COLUMNS};"))
}

pub fn delete(comment_id: i32) -> Statement {
    Statement::new("DELETE FROM comments WHERE comment_id = ")
        .bind(comment_id)
        .then(" RETURNING comment_id;")
}

pub fn update_votes(comment_id: i32, inc_votes: i32) -> Statement {
    Statement::new("UPDATE comments SET votes = votes + ")
        .bind(inc_votes)
        .then(" WHERE comment_id = ")
        .bind(comment_id)
        .then(&format!(" RETURNING {COMMENT_COLUMNS};"))
}

/// Comments on an article, newest first; 404 when the article is missing
pub async fn fetch_for_article<S: StoreExecutor>(
    state: &AppState<S>,
    article_id: i32,
) -> Result<Vec<Comment>> {
    article::ensure_exists(state, article_id).await?;
    let rows = state
        .fetch(DatabaseOperation::Query, &select_for_article(article_id))
        .await?;
    Ok(rows.decode()?)
}

/// Unknown article or user surfaces as a foreign key failure (404)
pub async fn create_comment<S: StoreExecutor>(
    state: &AppState<S>,
    article_id: i32,
    comment: NewComment,
) -> Result<Comment> {
    let username = required_text(&comment.username)?;
    let body = required_text(&comment.body)?;
    let rows = state
        .fetch(DatabaseOperation::Insert, &insert(article_id, username, body))
        .await?;
    rows.first()?
        .ok_or_else(|| Error::Internal("insert returned no comment".to_string()))
}

pub async fn remove_comment<S: StoreExecutor>(state: &AppState<S>, comment_id: i32) -> Result<()> {
    let rows = state
        .fetch(DatabaseOperation::Delete, &delete(comment_id))
        .await?;
    if rows.is_empty() {
        return Err(Error::record_not_found());
    }
    Ok(())
}

pub async fn add_votes<S: StoreExecutor>(
    state: &AppState<S>,
    comment_id: i32,
    inc_votes: i32,
) -> Result<Comment> {
    let rows = state
        .fetch(DatabaseOperation::Update, &update_votes(comment_id, inc_votes))
        .await?;
    rows.first()?.ok_or_else(Error::record_not_found)
}
