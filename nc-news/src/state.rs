//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    database::PgStore,
    error::{DatabaseError, DatabaseOperation, Result},
    listing::ListingService,
    store::{with_timeout, Rows, Statement, StoreExecutor},
};

/// Application state shared across handlers
///
/// Generic over the store so handlers run unchanged against a scripted
/// executor in tests. Defaults to [`PgStore`].
pub struct AppState<S = PgStore> {
    config: Arc<Config>,
    store: Arc<S>,
    listing: ListingService<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
            listing: self.listing.clone(),
        }
    }
}

impl<S: StoreExecutor> AppState<S> {
    /// Create state around an already-connected store
    pub fn new(config: Config, store: S) -> Self {
        let store = Arc::new(store);
        let listing = ListingService::new(Arc::clone(&store), config.query_timeout());
        Self {
            config: Arc::new(config),
            store,
            listing,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Article listing service sharing this state's store
    pub fn listing(&self) -> &ListingService<S> {
        &self.listing
    }

    pub fn query_timeout(&self) -> Duration {
        self.config.query_timeout()
    }

    /// Run one statement under the configured deadline
    pub async fn fetch(
        &self,
        operation: DatabaseOperation,
        statement: &Statement,
    ) -> std::result::Result<Rows, DatabaseError> {
        with_timeout(self.query_timeout(), operation, self.store.fetch(statement)).await
    }
}

impl AppState<PgStore> {
    /// Connect to PostgreSQL and build state
    pub async fn connect(config: Config) -> Result<Self> {
        let store = PgStore::connect(&config.database).await?;
        Ok(Self::new(config, store))
    }
}
