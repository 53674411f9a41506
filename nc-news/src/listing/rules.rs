//! Allow-lists for article listing parameters
//!
//! Every key of an incoming query string is classified against these fixed
//! lists before it can influence statement text. Sort columns and directions
//! are the only identifiers ever interpolated into SQL, and only after they
//! have been matched here.

use std::fmt;
use std::str::FromStr;

use super::ListingQuery;

/// Filter keys
pub const FILTER_KEYS: &[&str] = &["topic", "author"];

/// Sort keys
pub const SORT_KEYS: &[&str] = &["sort_by", "order_by"];

/// Paging keys
pub const PAGING_KEYS: &[&str] = &["page", "limit"];

/// What a raw query key means to the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// `topic` or `author`
    Filter,
    /// `sort_by` or `order_by`
    Sort,
    /// `page` or `limit`
    Paging,
    /// Anything else
    Unrecognized,
}

/// Classify a single query key
pub fn classify_key(key: &str) -> KeyClass {
    if FILTER_KEYS.contains(&key) {
        KeyClass::Filter
    } else if SORT_KEYS.contains(&key) {
        KeyClass::Sort
    } else if PAGING_KEYS.contains(&key) {
        KeyClass::Paging
    } else {
        KeyClass::Unrecognized
    }
}

/// True iff at least one key of `query` is on the allow-list
pub fn is_any_key_recognized(query: &ListingQuery) -> bool {
    query
        .keys()
        .any(|key| classify_key(key) != KeyClass::Unrecognized)
}

/// Membership test against the sortable column allow-list
pub fn is_valid_sort_column(name: &str) -> bool {
    name.parse::<SortColumn>().is_ok()
}

/// Membership test against `{asc, desc}`
pub fn is_valid_direction(name: &str) -> bool {
    name.parse::<SortDirection>().is_ok()
}

/// Columns an article listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortColumn {
    Title,
    Topic,
    Author,
    Body,
    Votes,
    #[default]
    CreatedAt,
    CommentCount,
}

impl SortColumn {
    /// Every sortable column, in declaration order
    pub const ALL: [SortColumn; 7] = [
        Self::Title,
        Self::Topic,
        Self::Author,
        Self::Body,
        Self::Votes,
        Self::CreatedAt,
        Self::CommentCount,
    ];

    /// The name clients send in `sort_by`
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Topic => "topic",
            Self::Author => "author",
            Self::Body => "body",
            Self::Votes => "votes",
            Self::CreatedAt => "created_at",
            Self::CommentCount => "comment_count",
        }
    }

    /// The expression placed in ORDER BY
    ///
    /// `comment_count` is the aggregate's output alias, the rest are
    /// qualified article columns.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Title => "a.title",
            Self::Topic => "a.topic",
            Self::Author => "a.author",
            Self::Body => "a.body",
            Self::Votes => "a.votes",
            Self::CreatedAt => "a.created_at",
            Self::CommentCount => "comment_count",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Sort direction for article listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Ascending (A-Z, oldest first)
    Asc,
    /// Descending (Z-A, newest first)
    #[default]
    Desc,
}

impl SortDirection {
    /// Convert to SQL ORDER BY clause fragment
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

/// A name that is not on an allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName(pub String);

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not an allowed value", self.0)
    }
}

impl std::error::Error for UnknownName {}
