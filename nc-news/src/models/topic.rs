use serde::{Deserialize, Serialize};

use crate::error::{DatabaseOperation, Result};
use crate::state::AppState;
use crate::store::{Statement, StoreExecutor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

pub fn select_all() -> Statement {
    Statement::new("SELECT slug, description FROM topics ORDER BY slug;")
}

/// Every topic
pub async fn fetch_topics<S: StoreExecutor>(state: &AppState<S>) -> Result<Vec<Topic>> {
    let rows = state.fetch(DatabaseOperation::Query, &select_all()).await?;
    Ok(rows.decode()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::testing::ScriptedStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_topics() {
        let state = AppState::new(
            Config::default(),
            ScriptedStore::new().respond(vec![
                json!({"slug": "cats", "description": "Not dogs"}),
                json!({"slug": "mitch", "description": "The man, the Mitch, the legend"}),
            ]),
        );
        let topics = fetch_topics(&state).await.unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].slug, "cats");
        assert!(state.store().statements()[0].binds().is_empty());
    }
}
