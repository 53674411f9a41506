//! Article listings: filtered, sorted, paginated reads of `articles`
//!
//! A raw query-string mapping travels through four stages:
//!
//! - [`rules`] classifies keys against fixed allow-lists
//! - [`builder`] parses typed specs and renders parameterized statements
//! - [`paginator`] turns store rows into a [`ListingResult`]
//! - [`service`] sequences the above against a [`StoreExecutor`](crate::store::StoreExecutor)
//!
//! Failures stay typed as [`ListingError`] until the HTTP boundary converts
//! them into [`crate::error::Error`].

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::error::{self, DatabaseError, DatabaseErrorKind, RECORDS_NOT_FOUND};
use crate::models::Article;

pub mod builder;
pub mod paginator;
pub mod rules;
pub mod service;

pub use builder::{
    ArticleQueryBuilder, ListingFilter, PageSpec, SortSpec, DEFAULT_LIMIT, DEFAULT_PAGE,
};
pub use rules::{
    classify_key, is_any_key_recognized, is_valid_direction, is_valid_sort_column, KeyClass,
    SortColumn, SortDirection,
};
pub use service::ListingService;

/// Raw listing parameters as they arrived in the query string
///
/// Repeated keys keep their last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    params: BTreeMap<String, String>,
}

impl ListingQuery {
    /// Build from key/value pairs in arrival order
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { params }
    }

    /// Value for `key`, if present
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Every key present
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// One page of articles plus the size of the whole matching set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingResult {
    pub articles: Vec<Article>,
    pub total_count: i64,
}

/// Discriminant of [`ListingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingErrorKind {
    InvalidInput,
    RecordsNotFound,
    ServiceUnavailable,
    Store,
}

/// Why a listing call failed
#[derive(Debug, Clone, Error)]
pub enum ListingError {
    /// Malformed or unrecognized query shape
    #[error("Invalid listing query: {reason}")]
    InvalidInput { reason: String },

    /// The query was well formed but matched no articles
    #[error("No articles match the listing query")]
    RecordsNotFound,

    /// The store did not answer before the deadline
    #[error("Store unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other store failure, passed through untouched
    #[error(transparent)]
    Store(DatabaseError),
}

impl ListingError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ListingErrorKind {
        match self {
            Self::InvalidInput { .. } => ListingErrorKind::InvalidInput,
            Self::RecordsNotFound => ListingErrorKind::RecordsNotFound,
            Self::ServiceUnavailable(_) => ListingErrorKind::ServiceUnavailable,
            Self::Store(_) => ListingErrorKind::Store,
        }
    }
}

impl From<DatabaseError> for ListingError {
    fn from(err: DatabaseError) -> Self {
        match err.kind {
            DatabaseErrorKind::Timeout => Self::ServiceUnavailable(err.message),
            _ => Self::Store(err),
        }
    }
}

impl From<ListingError> for error::Error {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::InvalidInput { .. } => error::Error::invalid_input(),
            ListingError::RecordsNotFound => error::Error::NotFound(RECORDS_NOT_FOUND.to_string()),
            ListingError::ServiceUnavailable(msg) => error::Error::ServiceUnavailable(msg),
            ListingError::Store(e) => error::Error::Database(e),
        }
    }
}
