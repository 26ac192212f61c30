//! Venue catalog storage. The catalog is seeded by migration and read-only
//! at runtime.

use crate::error::Result;
use crate::models::Venue;
use sqlx::SqlitePool;

/// Repository for the `venues` table.
#[derive(Clone)]
pub struct VenueStore {
    pool: SqlitePool,
}

impl VenueStore {
    /// Create a new store over the shared pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All venues, in seed order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn list(&self) -> Result<Vec<Venue>> {
        let venues = sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(venues)
    }

    /// A single venue by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn find(&self, id: &str) -> Result<Option<Venue>> {
        let venue = sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(venue)
    }
}
