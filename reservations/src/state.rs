//! Application state shared across HTTP handlers.

use crate::config::Config;
use crate::store::{ReservationStore, UserStore, VenueStore};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared state: one store per table plus the immutable configuration.
#[derive(Clone)]
pub struct AppState {
    /// User accounts.
    pub users: UserStore,
    /// Venue catalog.
    pub venues: VenueStore,
    /// Bookings.
    pub reservations: ReservationStore,
    /// Runtime configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the state from a connection pool and configuration.
    #[must_use]
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            users: UserStore::new(pool.clone()),
            venues: VenueStore::new(pool.clone()),
            reservations: ReservationStore::new(pool),
            config: Arc::new(config),
        }
    }
}
