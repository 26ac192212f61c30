//! Error taxonomy for the booking service.

use coworkd_common::AppError;
use thiserror::Error;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, ReservationError>;

/// Everything that can go wrong between a request and a committed booking.
///
/// The display strings are the user-facing messages; the conversion into
/// [`AppError`] decides the HTTP status.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// Booking outside the 8:00-17:00 window, or end not after start.
    #[error("Invalid time range. Reservations must be between 8:00 AM and 5:00 PM.")]
    InvalidTimeRange,

    /// Headcount over the cap.
    #[error("Maximum participants cannot exceed 20 people.")]
    CapacityExceeded,

    /// Overlap with an existing booking on the same venue and date.
    #[error("Time slot conflicts with existing reservation")]
    TimeConflict,

    /// Signup with an email that already has an account.
    #[error("User already exists")]
    DuplicateUser,

    /// Bad email or password at login. One message for both, deliberately.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, or stale bearer token; or the token's user is gone.
    #[error("Unauthorized")]
    Unauthorized,

    /// Acting on a reservation the requester neither owns nor administers.
    #[error("{0}")]
    Forbidden(&'static str),

    /// No such reservation.
    #[error("Reservation not found")]
    ReservationNotFound,

    /// No such venue.
    #[error("Venue not found")]
    VenueNotFound,

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Password hashing failure. Carries no detail on purpose.
    #[error("Internal server error")]
    Hashing,
}

impl From<sqlx::Error> for ReservationError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::InvalidTimeRange
            | ReservationError::CapacityExceeded
            | ReservationError::TimeConflict
            | ReservationError::DuplicateUser => AppError::bad_request(err.to_string()),
            ReservationError::InvalidCredentials | ReservationError::Unauthorized => {
                AppError::unauthorized(err.to_string())
            }
            ReservationError::Forbidden(msg) => AppError::forbidden(msg),
            ReservationError::ReservationNotFound | ReservationError::VenueNotFound => {
                AppError::not_found(err.to_string())
            }
            ReservationError::Database(detail) => {
                AppError::internal("Internal server error").with_source(anyhow::anyhow!(detail))
            }
            ReservationError::Hashing => AppError::internal("Internal server error"),
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
        let cases: Vec<(ReservationError, StatusCode)> = vec![
            (ReservationError::InvalidTimeRange, StatusCode::BAD_REQUEST),
            (ReservationError::TimeConflict, StatusCode::BAD_REQUEST),
            (ReservationError::DuplicateUser, StatusCode::BAD_REQUEST),
            (ReservationError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                ReservationError::Forbidden("Admin access required"),
                StatusCode::FORBIDDEN,
            ),
            (ReservationError::ReservationNotFound, StatusCode::NOT_FOUND),
            (
                ReservationError::Database("disk I/O error".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_database_detail_not_in_message() {
        let app: AppError = ReservationError::Database("secret dsn".to_string()).into();
        assert!(!app.to_string().contains("secret dsn"));
    }
}
