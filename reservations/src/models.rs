//! Database rows and wire types for the booking service.
//!
//! Rows derive [`sqlx::FromRow`] and are mapped into camelCase response
//! payloads at the handler boundary; the two never mix.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use std::fmt;
use std::str::FromStr;

/// A registered account.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Row id, also the JWT subject.
    pub id: i64,
    /// Unique login email.
    pub email: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Admins see and manage every reservation.
    pub is_admin: bool,
    /// Signup timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// A bookable room. Seeded by migration, read-only afterward.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Venue {
    /// Stable string id ("1".."5").
    pub id: String,
    /// Room name.
    pub name: String,
    /// Seats.
    pub capacity: i64,
}

/// A booking row.
#[derive(Debug, Clone, FromRow)]
pub struct Reservation {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Booked venue.
    pub venue_id: String,
    /// Free-text purpose.
    pub purpose: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Wall-clock start, `HH:MM`.
    pub start_time: String,
    /// Wall-clock end, `HH:MM`.
    pub end_time: String,
    /// Organizer display name.
    pub name: String,
    /// Organizer's organization.
    pub organization: String,
    /// Expected headcount, capped at 20.
    pub max_participants: i64,
    /// Always `confirmed` today.
    pub status: String,
    /// Attendance list, set by an admin after the fact.
    pub attendance: Option<Json<Vec<String>>>,
    /// Creation timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// A reservation joined with its owner's identity, the shape every read
/// path returns.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationWithOwner {
    /// The reservation row.
    #[sqlx(flatten)]
    pub reservation: Reservation,
    /// Owner email.
    pub user_email: String,
    /// Owner display name.
    pub user_name: String,
}

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Admin flag, honored at signup like the legacy service did.
    #[serde(default, rename = "isAdmin")]
    pub is_admin: bool,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Booking creation request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    /// Venue id.
    pub venue: String,
    /// Free-text purpose.
    pub purpose: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Wall-clock start, `HH:MM`.
    pub start_time: String,
    /// Wall-clock end, `HH:MM`.
    pub end_time: String,
    /// Organizer display name.
    pub name: String,
    /// Organizer's organization.
    #[serde(default)]
    pub organization: String,
    /// Expected headcount.
    #[serde(default)]
    pub max_participants: i64,
}

/// Attendance update request body.
#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    /// Replacement attendance list.
    #[serde(default)]
    pub attendance: Vec<String>,
}

/// User payload inside auth responses.
#[derive(Debug, Serialize)]
pub struct UserPayload {
    /// Row id.
    pub id: i64,
    /// Login email.
    pub email: String,
    /// Profile fields, nested the way the legacy clients expect.
    pub user_metadata: UserMetadata,
}

/// Nested profile fields.
#[derive(Debug, Serialize)]
pub struct UserMetadata {
    /// Display name.
    pub name: String,
    /// Admin flag.
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

/// Signup/login response body.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The account.
    pub user: UserPayload,
    /// Signed bearer token.
    pub access_token: String,
}

impl From<&User> for UserPayload {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            user_metadata: UserMetadata {
                name: user.name.clone(),
                is_admin: user.is_admin,
            },
        }
    }
}

/// Reservation response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    /// Row id.
    pub id: i64,
    /// Owning user id.
    pub user_id: i64,
    /// Owner email.
    pub user_email: String,
    /// Owner display name.
    pub user_name: String,
    /// Venue id.
    pub venue: String,
    /// Free-text purpose.
    pub purpose: String,
    /// Calendar date.
    pub date: String,
    /// Wall-clock start.
    pub start_time: String,
    /// Wall-clock end.
    pub end_time: String,
    /// Organizer display name.
    pub name: String,
    /// Organizer's organization.
    pub organization: String,
    /// Expected headcount.
    pub max_participants: i64,
    /// Booking status.
    pub status: String,
    /// Attendance list, present once an admin has set it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Vec<String>>,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<ReservationWithOwner> for ReservationResponse {
    fn from(row: ReservationWithOwner) -> Self {
        let r = row.reservation;
        Self {
            id: r.id,
            user_id: r.user_id,
            user_email: row.user_email,
            user_name: row.user_name,
            venue: r.venue_id,
            purpose: r.purpose,
            date: r.date,
            start_time: r.start_time,
            end_time: r.end_time,
            name: r.name,
            organization: r.organization,
            max_participants: r.max_participants,
            status: r.status,
            attendance: r.attendance.map(|Json(list)| list),
            created_at: r.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

/// Wall-clock time of day parsed from an `H:MM` / `HH:MM` string.
///
/// Reservations keep their times as strings; this is the parsed view the
/// conflict and window checks work on. Ordering is lexicographic on
/// `(hour, minute)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    /// Hour component, 0-23.
    pub hour: u8,
    /// Minute component, 0-59.
    pub minute: u8,
}

/// Raised when a time string does not look like `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTime;

impl fmt::Display for InvalidTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid wall-clock time")
    }
}

impl std::error::Error for InvalidTime {}

impl FromStr for TimeOfDay {
    type Err = InvalidTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s.split_once(':').ok_or(InvalidTime)?;
        let hour: u8 = h.parse().map_err(|_| InvalidTime)?;
        let minute: u8 = m.parse().map_err(|_| InvalidTime)?;
        if hour > 23 || minute > 59 {
            return Err(InvalidTime);
        }
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_time_parsing() {
        let t: TimeOfDay = "09:30".parse().unwrap();
        assert_eq!((t.hour, t.minute), (9, 30));

        // Unpadded hours are what the legacy clients sometimes sent.
        let t: TimeOfDay = "8:00".parse().unwrap();
        assert_eq!((t.hour, t.minute), (8, 0));

        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("09:60".parse::<TimeOfDay>().is_err());
        assert!("0900".parse::<TimeOfDay>().is_err());
        assert!("".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_time_ordering() {
        let a: TimeOfDay = "08:30".parse().unwrap();
        let b: TimeOfDay = "09:00".parse().unwrap();
        let c: TimeOfDay = "9:00".parse().unwrap();
        assert!(a < b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_time_display_zero_pads() {
        let t: TimeOfDay = "8:05".parse().unwrap();
        assert_eq!(t.to_string(), "08:05");
    }
}
