//! Session log storage.
//!
//! All SQL for the `session_logs` table lives here. Day filtering uses
//! SQLite's `date()` over the stored timestamps; timestamps are written at
//! second precision so the text form stays parseable by those functions.

use crate::error::Result;
use crate::models::SessionLog;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, SqlitePool};

/// Fields recorded at login time.
#[derive(Debug)]
pub struct NewSession<'a> {
    /// Visitor email.
    pub email: &'a str,
    /// Visitor name.
    pub name: &'a str,
    /// Reported position.
    pub position: &'a str,
    /// Terms acknowledgement.
    pub terms: bool,
    /// Check-in time.
    pub timein: NaiveDateTime,
}

/// Distinct visitors for one day, used by the monthly report.
#[derive(Debug, FromRow)]
pub struct DayVisitors {
    /// Calendar day, `YYYY-MM-DD`.
    pub day: String,
    /// Distinct visitor emails that day.
    pub visitors: i64,
}

/// Repository for the `session_logs` table.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    /// Create a new store over the shared pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a login and return the stored row.
    ///
    /// # Errors
    ///
    /// [`crate::error::SessionError::LoginRace`] when the open-session index
    /// rejects a concurrent duplicate; [`crate::error::SessionError::Database`]
    /// otherwise.
    pub async fn insert(&self, new: NewSession<'_>) -> Result<SessionLog> {
        let result = sqlx::query(
            "INSERT INTO session_logs (email, name, position, terms, timein, login)
             VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(new.email)
        .bind(new.name)
        .bind(new.position)
        .bind(new.terms)
        .bind(new.timein)
        .execute(&self.pool)
        .await?;

        self.find(result.last_insert_rowid()).await
    }

    async fn find(&self, id: i64) -> Result<SessionLog> {
        let row = sqlx::query_as::<_, SessionLog>("SELECT * FROM session_logs WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// The open session for a visitor on a day, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SessionError::Database`] on storage failure.
    pub async fn open_for_day(&self, email: &str, day: NaiveDate) -> Result<Option<SessionLog>> {
        let row = sqlx::query_as::<_, SessionLog>(
            "SELECT * FROM session_logs
             WHERE email = ? AND date(timein) = ? AND login = 1 AND logout IS NULL
             ORDER BY timein DESC
             LIMIT 1",
        )
        .bind(email)
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// The latest session row for a visitor on a day, open or closed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SessionError::Database`] on storage failure.
    pub async fn latest_for_day(&self, email: &str, day: NaiveDate) -> Result<Option<SessionLog>> {
        let row = sqlx::query_as::<_, SessionLog>(
            "SELECT * FROM session_logs
             WHERE email = ? AND date(timein) = ?
             ORDER BY timein DESC
             LIMIT 1",
        )
        .bind(email)
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// The most recently closed session for a visitor on a day.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SessionError::Database`] on storage failure.
    pub async fn latest_closed_for_day(
        &self,
        email: &str,
        day: NaiveDate,
    ) -> Result<Option<SessionLog>> {
        let row = sqlx::query_as::<_, SessionLog>(
            "SELECT * FROM session_logs
             WHERE email = ? AND date(timein) = ? AND logout = 1
             ORDER BY timeout DESC
             LIMIT 1",
        )
        .bind(email)
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Close an open session: set the logout flag, check-out time, and the
    /// visitor's exit answers.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SessionError::Database`] on storage failure.
    pub async fn close(
        &self,
        id: i64,
        resources: Option<&str>,
        feedback: Option<&str>,
        timeout: NaiveDateTime,
    ) -> Result<SessionLog> {
        sqlx::query(
            "UPDATE session_logs
             SET logout = 1, timeout = ?, resources = ?, feedback = ?
             WHERE id = ?",
        )
        .bind(timeout)
        .bind(resources)
        .bind(feedback)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find(id).await
    }

    /// Every session row for a day, insertion order. Feeds the daily export.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SessionError::Database`] on storage failure.
    pub async fn for_day(&self, day: NaiveDate) -> Result<Vec<SessionLog>> {
        let rows = sqlx::query_as::<_, SessionLog>(
            "SELECT * FROM session_logs WHERE date(timein) = ? ORDER BY id",
        )
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Distinct `(email, day)` pairs in a year/month, optionally narrowed to
    /// one day. Repeated login cycles on the same day count once.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SessionError::Database`] on storage failure.
    pub async fn distinct_visits(
        &self,
        year: i32,
        month: u32,
        day: Option<u32>,
    ) -> Result<i64> {
        let count: i64 = if let Some(day) = day {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM (
                     SELECT DISTINCT email, date(timein) FROM session_logs
                     WHERE CAST(strftime('%Y', timein) AS INTEGER) = ?
                       AND CAST(strftime('%m', timein) AS INTEGER) = ?
                       AND CAST(strftime('%d', timein) AS INTEGER) = ?
                 )",
            )
            .bind(year)
            .bind(month)
            .bind(day)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM (
                     SELECT DISTINCT email, date(timein) FROM session_logs
                     WHERE CAST(strftime('%Y', timein) AS INTEGER) = ?
                       AND CAST(strftime('%m', timein) AS INTEGER) = ?
                 )",
            )
            .bind(year)
            .bind(month)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(count)
    }

    /// Distinct visitors per day across a month, for the monthly summary.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SessionError::Database`] on storage failure.
    pub async fn visits_by_day(&self, year: i32, month: u32) -> Result<Vec<DayVisitors>> {
        let rows = sqlx::query_as::<_, DayVisitors>(
            "SELECT date(timein) AS day, COUNT(DISTINCT email) AS visitors
             FROM session_logs
             WHERE CAST(strftime('%Y', timein) AS INTEGER) = ?
               AND CAST(strftime('%m', timein) AS INTEGER) = ?
             GROUP BY date(timein)
             ORDER BY day",
        )
        .bind(year)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete every session row and reset the id sequence, so the next
    /// login gets id 1.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::SessionError::Database`] on storage failure.
    pub async fn reset(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM session_logs")
            .execute(&mut *tx)
            .await?;

        // sqlite_sequence only exists once an AUTOINCREMENT insert happened.
        let has_sequence: i64 = sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'
             )",
        )
        .fetch_one(&mut *tx)
        .await?;
        if has_sequence != 0 {
            sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'session_logs'")
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
