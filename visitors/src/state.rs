//! Application state shared across HTTP handlers.

use crate::config::Config;
use crate::store::SessionStore;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared state: the session store plus the immutable configuration.
#[derive(Clone)]
pub struct AppState {
    /// Session log storage.
    pub sessions: SessionStore,
    /// Runtime configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the state from a connection pool and configuration.
    #[must_use]
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            sessions: SessionStore::new(pool),
            config: Arc::new(config),
        }
    }
}
