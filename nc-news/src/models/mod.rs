//! Read models and the statements that load and change them
//!
//! Each submodule pairs its records with async functions that render a
//! [`Statement`](crate::store::Statement), run it through
//! [`AppState::fetch`](crate::state::AppState::fetch) and decode the rows.

pub mod article;
pub mod comment;
pub mod topic;
pub mod user;

pub use article::{Article, NewArticle, DEFAULT_ARTICLE_IMG_URL};
pub use comment::{Comment, NewComment};
pub use topic::Topic;
pub use user::User;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Body of a vote PATCH: `{"inc_votes": n}`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VoteUpdate {
    pub inc_votes: i32,
}

impl VoteUpdate {
    /// Reject a zero increment
    pub fn validate(self) -> Result<i32> {
        if self.inc_votes == 0 {
            return Err(Error::invalid_input());
        }
        Ok(self.inc_votes)
    }
}

/// Trimmed, non-empty text or an invalid-input error
pub(crate) fn required_text(value: &str) -> Result<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input());
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_update_validation() {
        assert_eq!(VoteUpdate { inc_votes: -3 }.validate().unwrap(), -3);
        assert!(VoteUpdate { inc_votes: 0 }.validate().is_err());
    }

    #[test]
    fn test_vote_update_rejects_non_integers() {
        assert!(serde_json::from_str::<VoteUpdate>(r#"{"inc_votes": "five"}"#).is_err());
        assert!(serde_json::from_str::<VoteUpdate>(r#"{"inc_votes": 1.5}"#).is_err());
        assert!(serde_json::from_str::<VoteUpdate>(r#"{}"#).is_err());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("  hello ").unwrap(), "hello");
        assert!(required_text("   ").is_err());
    }
}
