use serde::{Deserialize, Serialize};

use crate::error::{DatabaseOperation, Error, Result};
use crate::state::AppState;
use crate::store::{Statement, StoreExecutor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

const USER_COLUMNS: &str = "SELECT username, name, avatar_url FROM users";

pub fn select_all() -> Statement {
    Statement::new(USER_COLUMNS).then(" ORDER BY username;")
}

pub fn select_by_username(username: &str) -> Statement {
    Statement::new(USER_COLUMNS)
        .then(" WHERE username = ")
        .bind(username)
        .then(";")
}

pub async fn fetch_users<S: StoreExecutor>(state: &AppState<S>) -> Result<Vec<User>> {
    let rows = state.fetch(DatabaseOperation::Query, &select_all()).await?;
    Ok(rows.decode()?)
}

/// Look up one user, 404 when absent
pub async fn fetch_user<S: StoreExecutor>(state: &AppState<S>, username: &str) -> Result<User> {
    let rows = state
        .fetch(DatabaseOperation::Query, &select_by_username(username))
        .await?;
    rows.first()?.ok_or_else(Error::record_not_found)
}
