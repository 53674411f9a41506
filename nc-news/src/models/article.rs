use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::required_text;
use crate::error::{DatabaseOperation, Error, Result};
use crate::listing::builder::ARTICLE_PROJECTION;
use crate::state::AppState;
use crate::store::{Statement, StoreExecutor};

/// Image used when a new article does not bring its own
pub const DEFAULT_ARTICLE_IMG_URL: &str =
    "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700";

/// An article with its derived comment count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub votes: i32,
    pub article_img_url: Option<String>,
    pub comment_count: i64,
}

/// Body of `POST /api/articles`
#[derive(Debug, Clone, Deserialize)]
pub struct NewArticle {
    pub author: String,
    pub title: String,
    pub body: String,
    pub topic: String,
    #[serde(default)]
    pub article_img_url: Option<String>,
}

impl NewArticle {
    /// Trim required fields and fill in the default image
    pub fn validate(self) -> Result<Self> {
        let article_img_url = match self.article_img_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => DEFAULT_ARTICLE_IMG_URL.to_string(),
        };
        Ok(Self {
            author: required_text(&self.author)?.to_string(),
            title: required_text(&self.title)?.to_string(),
            body: required_text(&self.body)?.to_string(),
            topic: required_text(&self.topic)?.to_string(),
            article_img_url: Some(article_img_url),
        })
    }
}

const RETURNING_ARTICLE: &str =
    " RETURNING article_id, title, topic, author, body, created_at, votes, article_img_url";

pub fn select_by_id(article_id: i32) -> Statement {
    Statement::new(ARTICLE_PROJECTION)
        .then(" WHERE a.article_id = ")
        .bind(article_id)
        .then(" GROUP BY a.article_id;")
}

pub fn select_exists(article_id: i32) -> Statement {
    Statement::new("SELECT article_id FROM articles WHERE article_id = ")
        .bind(article_id)
        .then(";")
}

/// Insert and return the new row with a zero comment count
pub fn insert(article: &NewArticle) -> Statement {
    let img = article
        .article_img_url
        .as_deref()
        .unwrap_or(DEFAULT_ARTICLE_IMG_URL);
    Statement::new(
        "WITH inserted AS (INSERT INTO articles (author, title, body, topic, article_img_url) VALUES (",
    )
    .bind(article.author.as_str())
    .then(", ")
    .bind(article.title.as_str())
    .then(", ")
    .bind(article.body.as_str())
    .then(", ")
    .bind(article.topic.as_str())
    .then(", ")
    .bind(img)
    .then(")")
    .then(RETURNING_ARTICLE)
    .then(
        ") SELECT article_id, title, topic, author, body, created_at, votes, article_img_url, \
0::INT8 AS comment_count FROM inserted;",
    )
}

/// Add `inc_votes` to an article and return it with its comment count
pub fn update_votes(article_id: i32, inc_votes: i32) -> Statement {
    Statement::new("WITH updated AS (UPDATE articles SET votes = votes + ")
        .bind(inc_votes)
        .then(" WHERE article_id = ")
        .bind(article_id)
        .then(RETURNING_ARTICLE)
        .then(
            ") SELECT u.article_id, u.title, u.topic, u.author, u.body, u.created_at, u.votes, \
u.article_img_url, (SELECT COUNT(*) FROM comments AS c WHERE c.article_id = u.article_id)::INT8 \
AS comment_count FROM updated AS u;",
        )
}

pub async fn fetch_article<S: StoreExecutor>(
    state: &AppState<S>,
    article_id: i32,
) -> Result<Article> {
    let rows = state
        .fetch(DatabaseOperation::Query, &select_by_id(article_id))
        .await?;
    rows.first()?.ok_or_else(Error::record_not_found)
}

/// 404 unless the article exists
pub async fn ensure_exists<S: StoreExecutor>(state: &AppState<S>, article_id: i32) -> Result<()> {
    let rows = state
        .fetch(DatabaseOperation::Query, &select_exists(article_id))
        .await?;
    if rows.is_empty() {
        return Err(Error::record_not_found());
    }
    Ok(())
}

/// Unknown author or topic surfaces as a foreign key failure (404)
pub async fn create_article<S: StoreExecutor>(
    state: &AppState<S>,
    article: NewArticle,
) -> Result<Article> {
    let article = article.validate()?;
    let rows = state
        .fetch(DatabaseOperation::Insert, &insert(&article))
        .await?;
    rows.first()?
        .ok_or_else(|| Error::Internal("insert returned no article".to_string()))
}

pub async fn add_votes<S: StoreExecutor>(
    state: &AppState<S>,
    article_id: i32,
    inc_votes: i32,
) -> Result<Article> {
    let rows = state
        .fetch(DatabaseOperation::Update, &update_votes(article_id, inc_votes))
        .await?;
    rows.first()?.ok_or_else(Error::record_not_found)
}
