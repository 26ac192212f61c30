//! Booking storage.
//!
//! The conflict check needs to read and insert inside one transaction, so
//! the per-slice read and the insert take an explicit connection; the ledger
//! composes them around [`ReservationStore::begin`].

use crate::error::Result;
use crate::models::{Reservation, ReservationWithOwner};
use chrono::{SubsecRound, Utc};
use sqlx::types::Json;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

/// Column list for the joined reservation + owner shape.
const SELECT_WITH_OWNER: &str = "SELECT r.*, u.email AS user_email, u.name AS user_name
     FROM reservations r
     JOIN users u ON u.id = r.user_id";

/// Fields required to persist a new booking.
#[derive(Debug)]
pub struct NewReservation<'a> {
    /// Owning user.
    pub user_id: i64,
    /// Venue id.
    pub venue_id: &'a str,
    /// Free-text purpose.
    pub purpose: &'a str,
    /// Calendar date.
    pub date: &'a str,
    /// Wall-clock start.
    pub start_time: &'a str,
    /// Wall-clock end.
    pub end_time: &'a str,
    /// Organizer display name.
    pub name: &'a str,
    /// Organizer's organization.
    pub organization: &'a str,
    /// Expected headcount.
    pub max_participants: i64,
}

/// Repository for the `reservations` table.
#[derive(Clone)]
pub struct ReservationStore {
    pool: SqlitePool,
}

impl ReservationStore {
    /// Create a new store over the shared pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a transaction for a read-then-write sequence.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] if the
    /// transaction cannot start.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// All reservations for one venue on one date, inside the caller's
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn for_venue_date(
        conn: &mut SqliteConnection,
        venue_id: &str,
        date: &str,
    ) -> Result<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE venue_id = ? AND date = ?",
        )
        .bind(venue_id)
        .bind(date)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Insert a booking inside the caller's transaction; returns the new id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn insert(conn: &mut SqliteConnection, new: NewReservation<'_>) -> Result<i64> {
        let created_at = Utc::now().naive_utc().trunc_subsecs(0);
        let result = sqlx::query(
            "INSERT INTO reservations
                (user_id, venue_id, purpose, date, start_time, end_time,
                 name, organization, max_participants, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'confirmed', ?)",
        )
        .bind(new.user_id)
        .bind(new.venue_id)
        .bind(new.purpose)
        .bind(new.date)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.name)
        .bind(new.organization)
        .bind(new.max_participants)
        .bind(created_at)
        .execute(conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// One reservation with its owner, by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn find(&self, id: i64) -> Result<Option<ReservationWithOwner>> {
        let row = sqlx::query_as::<_, ReservationWithOwner>(&format!(
            "{SELECT_WITH_OWNER} WHERE r.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Every reservation, insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn list_all(&self) -> Result<Vec<ReservationWithOwner>> {
        let rows = sqlx::query_as::<_, ReservationWithOwner>(&format!(
            "{SELECT_WITH_OWNER} ORDER BY r.id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// One user's reservations, insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<ReservationWithOwner>> {
        let rows = sqlx::query_as::<_, ReservationWithOwner>(&format!(
            "{SELECT_WITH_OWNER} WHERE r.user_id = ? ORDER BY r.id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Confirmed reservations for one venue and date, ordered by start time,
    /// for the availability view.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn confirmed_for_venue_date(
        &self,
        venue_id: &str,
        date: &str,
    ) -> Result<Vec<ReservationWithOwner>> {
        let rows = sqlx::query_as::<_, ReservationWithOwner>(&format!(
            "{SELECT_WITH_OWNER}
             WHERE r.venue_id = ? AND r.date = ? AND r.status = 'confirmed'
             ORDER BY r.start_time"
        ))
        .bind(venue_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete a reservation. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Overwrite the attendance list. Returns the number of rows touched;
    /// zero is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReservationError::Database`] on storage failure.
    pub async fn set_attendance(&self, id: i64, attendance: &[String]) -> Result<u64> {
        let result = sqlx::query("UPDATE reservations SET attendance = ? WHERE id = ?")
            .bind(Json(attendance))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
