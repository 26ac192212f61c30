//! User account storage.

use crate::error::{ReservationError, Result};
use crate::models::User;
use chrono::{SubsecRound, Utc};
use sqlx::SqlitePool;

/// Repository for the `users` table.
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// Create a new store over the shared pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::DuplicateUser`] when the email is taken,
    /// [`ReservationError::Database`] on any other storage failure.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        is_admin: bool,
    ) -> Result<User> {
        // Second precision keeps the stored text in the form SQLite's date
        // functions understand.
        let created_at = Utc::now().naive_utc().trunc_subsecs(0);

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, name, is_admin, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(is_admin)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return ReservationError::DuplicateUser;
                }
            }
            ReservationError::Database(e.to_string())
        })?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| ReservationError::Database("inserted user vanished".to_string()))
    }

    /// Look up an account by email.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Database`] on storage failure.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Database`] on storage failure.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
