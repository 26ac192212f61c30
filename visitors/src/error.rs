//! Error taxonomy for the visitor service.

use coworkd_common::AppError;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Request-path failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Login body missing email, name, position or the terms flag.
    #[error("Missing required fields")]
    MissingFields,

    /// An endpoint that only needs the email did not get one.
    #[error("Email is required")]
    EmailRequired,

    /// Logout with no open session and no closed one either.
    #[error("No active login session found for today.")]
    NoActiveSession,

    /// Visit counting without the mandatory year/month pair.
    #[error("Please provide at least 'month' and 'year'.")]
    MissingYearMonth,

    /// Two concurrent logins slipped past the handler check and hit the
    /// open-session unique index.
    #[error("Another login for this visitor is already in flight")]
    LoginRace,

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for SessionError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::LoginRace;
            }
        }
        Self::Database(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MissingFields
            | SessionError::EmailRequired
            | SessionError::MissingYearMonth => AppError::bad_request(err.to_string()),
            SessionError::NoActiveSession => AppError::not_found(err.to_string()),
            SessionError::LoginRace => AppError::conflict(err.to_string()),
            SessionError::Database(detail) => {
                AppError::internal("Internal server error").with_source(anyhow::anyhow!(detail))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::from(SessionError::MissingFields).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(SessionError::NoActiveSession).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(SessionError::LoginRace).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(SessionError::Database("oops".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
