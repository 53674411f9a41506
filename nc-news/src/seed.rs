//! Schema creation and data seeding
//!
//! [`reset_schema`] drops and recreates the four tables. [`seed`] does the
//! same and then bulk-inserts a [`SeedData`] set inside one transaction.
//! Comments name their article by title; titles are resolved to ids after
//! the articles are inserted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use crate::models::{Topic, User};

const TEST_TOPICS: &str = include_str!("../data/test/topics.json");
const TEST_USERS: &str = include_str!("../data/test/users.json");
const TEST_ARTICLES: &str = include_str!("../data/test/articles.json");
const TEST_COMMENTS: &str = include_str!("../data/test/comments.json");

const DROP_TABLES: &str = "DROP TABLE IF EXISTS comments, articles, users, topics;";

const CREATE_TABLES: [&str; 4] = [
    "CREATE TABLE topics (
        slug VARCHAR PRIMARY KEY,
        description VARCHAR
    );",
    "CREATE TABLE users (
        username VARCHAR PRIMARY KEY,
        name VARCHAR NOT NULL,
        avatar_url VARCHAR
    );",
    "CREATE TABLE articles (
        article_id SERIAL PRIMARY KEY,
        title VARCHAR NOT NULL,
        topic VARCHAR NOT NULL REFERENCES topics(slug),
        author VARCHAR NOT NULL REFERENCES users(username),
        body VARCHAR NOT NULL,
        created_at TIMESTAMP DEFAULT NOW(),
        votes INT DEFAULT 0 NOT NULL,
        article_img_url VARCHAR DEFAULT 'https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700'
    );",
    "CREATE TABLE comments (
        comment_id SERIAL PRIMARY KEY,
        body VARCHAR NOT NULL,
        article_id INT REFERENCES articles(article_id) ON DELETE CASCADE NOT NULL,
        author VARCHAR REFERENCES users(username) NOT NULL,
        votes INT DEFAULT 0 NOT NULL,
        created_at TIMESTAMP DEFAULT NOW()
    );",
];

/// Seeding failure
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("created_at {0} is not a valid millisecond timestamp")]
    InvalidTimestamp(i64),

    #[error("comment refers to unknown article '{0}'")]
    UnknownArticle(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// An article row as it appears in a data file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedArticle {
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    #[serde(default)]
    pub votes: i32,
    #[serde(default)]
    pub article_img_url: Option<String>,
}

/// A comment row as it appears in a data file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedComment {
    pub body: String,
    #[serde(default)]
    pub votes: i32,
    pub author: String,
    pub article_title: String,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
}

/// A complete data set: `topics.json`, `users.json`, `articles.json`, `comments.json`
#[derive(Debug, Clone)]
pub struct SeedData {
    pub topics: Vec<Topic>,
    pub users: Vec<User>,
    pub articles: Vec<SeedArticle>,
    pub comments: Vec<SeedComment>,
}

impl SeedData {
    /// The data set embedded in the crate, used by the integration tests
    pub fn test() -> Result<Self, SeedError> {
        Ok(Self {
            topics: parse("topics.json", TEST_TOPICS)?,
            users: parse("users.json", TEST_USERS)?,
            articles: parse("articles.json", TEST_ARTICLES)?,
            comments: parse("comments.json", TEST_COMMENTS)?,
        })
    }

    /// Load the four data files from `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SeedError> {
        let dir = dir.as_ref();
        Ok(Self {
            topics: read(dir, "topics.json")?,
            users: read(dir, "users.json")?,
            articles: read(dir, "articles.json")?,
            comments: read(dir, "comments.json")?,
        })
    }
}

fn parse<T: serde::de::DeserializeOwned>(file: &str, text: &str) -> Result<T, SeedError> {
    serde_json::from_str(text).map_err(|source| SeedError::Parse {
        file: file.to_string(),
        source,
    })
}

fn read<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T, SeedError> {
    let path = dir.join(file);
    let text = std::fs::read_to_string(&path).map_err(|source| SeedError::Io {
        path: path.clone(),
        source,
    })?;
    parse(file, &text)
}

fn timestamp(millis: i64) -> Result<NaiveDateTime, SeedError> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .ok_or(SeedError::InvalidTimestamp(millis))
}

/// Drop every table and recreate the empty schema
pub async fn reset_schema(pool: &PgPool) -> Result<(), SeedError> {
    let mut tx = pool.begin().await?;
    sqlx::query(DROP_TABLES).execute(&mut *tx).await?;
    for create in CREATE_TABLES {
        sqlx::query(create).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    tracing::info!("Schema recreated");
    Ok(())
}

/// Recreate the schema and insert `data`
pub async fn seed(pool: &PgPool, data: &SeedData) -> Result<(), SeedError> {
    reset_schema(pool).await?;

    let mut tx = pool.begin().await?;

    if !data.topics.is_empty() {
        QueryBuilder::<Postgres>::new("INSERT INTO topics (slug, description) ")
            .push_values(&data.topics, |mut row, topic| {
                row.push_bind(&topic.slug).push_bind(&topic.description);
            })
            .build()
            .execute(&mut *tx)
            .await?;
    }

    if !data.users.is_empty() {
        QueryBuilder::<Postgres>::new("INSERT INTO users (username, name, avatar_url) ")
            .push_values(&data.users, |mut row, user| {
                row.push_bind(&user.username)
                    .push_bind(&user.name)
                    .push_bind(&user.avatar_url);
            })
            .build()
            .execute(&mut *tx)
            .await?;
    }

    let mut article_ids = HashMap::new();
    if !data.articles.is_empty() {
        let created = data
            .articles
            .iter()
            .map(|a| timestamp(a.created_at))
            .collect::<Result<Vec<_>, _>>()?;

        let inserted: Vec<(i32, String)> = QueryBuilder::<Postgres>::new(
            "INSERT INTO articles (title, topic, author, body, created_at, votes, article_img_url) ",
        )
        .push_values(data.articles.iter().zip(created), |mut row, (article, created_at)| {
            row.push_bind(&article.title)
                .push_bind(&article.topic)
                .push_bind(&article.author)
                .push_bind(&article.body)
                .push_bind(created_at)
                .push_bind(article.votes)
                .push_bind(
                    article
                        .article_img_url
                        .as_deref()
                        .unwrap_or(crate::models::DEFAULT_ARTICLE_IMG_URL),
                );
        })
        .push(" RETURNING article_id, title")
        .build_query_as()
        .fetch_all(&mut *tx)
        .await?;

        article_ids.extend(inserted.into_iter().map(|(id, title)| (title, id)));
    }

    if !data.comments.is_empty() {
        let resolved = data
            .comments
            .iter()
            .map(|c| {
                let article_id = article_ids
                    .get(&c.article_title)
                    .copied()
                    .ok_or_else(|| SeedError::UnknownArticle(c.article_title.clone()))?;
                Ok((c, article_id, timestamp(c.created_at)?))
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        QueryBuilder::<Postgres>::new(
            "INSERT INTO comments (body, article_id, author, votes, created_at) ",
        )
        .push_values(resolved, |mut row, (comment, article_id, created_at)| {
            row.push_bind(&comment.body)
                .push_bind(article_id)
                .push_bind(&comment.author)
                .push_bind(comment.votes)
                .push_bind(created_at);
        })
        .build()
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        topics = data.topics.len(),
        users = data.users.len(),
        articles = data.articles.len(),
        comments = data.comments.len(),
        "Database seeded"
    );
    Ok(())
}
