//! Session rows and the visit state machine.

use chrono::NaiveDateTime;
use sqlx::FromRow;

/// One login event. Logout fills in `timeout`, `logout`, `resources` and
/// `feedback` on the same row.
#[derive(Debug, Clone, FromRow)]
pub struct SessionLog {
    /// Row id; resets to 1 after a bulk reset.
    pub id: i64,
    /// Visitor email. Visitors are not pre-registered, so this is the only key.
    pub email: String,
    /// Visitor name.
    pub name: String,
    /// Role or position the visitor reported.
    pub position: Option<String>,
    /// Terms-of-use acknowledgement.
    pub terms: bool,
    /// Check-in time.
    pub timein: Option<NaiveDateTime>,
    /// Check-out time, once logged out.
    pub timeout: Option<NaiveDateTime>,
    /// Set on login.
    pub login: Option<bool>,
    /// Set on logout; `NULL` while the session is open.
    pub logout: Option<bool>,
    /// Resources the visitor used, reported at logout.
    pub resources: Option<String>,
    /// Free-text feedback, reported at logout.
    pub feedback: Option<String>,
}

/// Where a visitor stands for a given day.
///
/// The storage encodes this in two nullable flags; every handler goes
/// through this derived view instead of pattern-matching the flags itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session row today.
    NoSession,
    /// An open session: logged in, not yet out.
    LoggedIn,
    /// The latest session today is closed. A fresh login is allowed again.
    LoggedOut,
}

impl SessionState {
    /// Derive the state from the latest session row of the day, if any.
    #[must_use]
    pub fn derive(latest_today: Option<&SessionLog>) -> Self {
        match latest_today {
            None => Self::NoSession,
            Some(row) if row.login == Some(true) && row.logout.is_none() => Self::LoggedIn,
            Some(_) => Self::LoggedOut,
        }
    }
}

/// Format a timestamp the way the check-in kiosk shows it, e.g. `09:15 AM`.
#[must_use]
pub fn twelve_hour(t: NaiveDateTime) -> String {
    t.format("%I:%M %p").to_string()
}

/// ISO-8601 rendering for response bodies.
#[must_use]
pub fn iso(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(login: Option<bool>, logout: Option<bool>) -> SessionLog {
        SessionLog {
            id: 1,
            email: "v@x.com".to_string(),
            name: "V".to_string(),
            position: None,
            terms: true,
            timein: None,
            timeout: None,
            login,
            logout,
            resources: None,
            feedback: None,
        }
    }

    #[test]
    fn test_state_no_row() {
        assert_eq!(SessionState::derive(None), SessionState::NoSession);
    }

    #[test]
    fn test_state_open_session() {
        let open = row(Some(true), None);
        assert_eq!(SessionState::derive(Some(&open)), SessionState::LoggedIn);
    }

    #[test]
    fn test_state_closed_session() {
        let closed = row(Some(true), Some(true));
        assert_eq!(SessionState::derive(Some(&closed)), SessionState::LoggedOut);
    }

    #[test]
    fn test_twelve_hour_format() {
        let t = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(twelve_hour(t), "02:05 PM");
        assert_eq!(iso(t), "2024-01-10T14:05:00");
    }
}
