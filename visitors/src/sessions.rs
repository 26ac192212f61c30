//! The check-in state machine.
//!
//! A visitor moves through `NoSession -> LoggedIn -> LoggedOut` per calendar
//! day. Only an *open* session blocks a new login; a visitor who logged out
//! may log in again the same day and accumulate further rows, which is the
//! behavior the kiosk clients expect.

use crate::error::{Result, SessionError};
use crate::models::{SessionLog, SessionState};
use crate::store::{NewSession, SessionStore};
use chrono::NaiveDateTime;
use tracing::info;

/// What `check-login-status` found for today.
#[derive(Debug)]
pub enum StatusOutcome {
    /// No session today; the kiosk should show the login modal.
    NotExisting,
    /// An open session; the kiosk should show the logout modal.
    AlreadyLoggedIn(SessionLog),
    /// The latest session today is closed; login is allowed again.
    LoggedOut(SessionLog),
}

/// What recording a login produced.
#[derive(Debug)]
pub enum LoginOutcome {
    /// An open session already exists; it is returned unchanged.
    AlreadyLoggedIn(SessionLog),
    /// A fresh session row was created.
    Created(SessionLog),
}

/// What recording a logout produced.
#[derive(Debug)]
pub enum LogoutOutcome {
    /// The open session was closed.
    Closed(SessionLog),
    /// There was no open session, but a closed one exists today.
    AlreadyLoggedOut(SessionLog),
}

/// Fields the login modal collects.
#[derive(Debug)]
pub struct Visitor<'a> {
    /// Visitor email.
    pub email: &'a str,
    /// Visitor name.
    pub name: &'a str,
    /// Reported position.
    pub position: &'a str,
    /// Terms acknowledgement.
    pub terms: bool,
}

/// Report where a visitor stands today.
///
/// # Errors
///
/// Returns [`SessionError::Database`] on storage failure.
pub async fn check_status(
    store: &SessionStore,
    email: &str,
    now: NaiveDateTime,
) -> Result<StatusOutcome> {
    let latest = store.latest_for_day(email, now.date()).await?;
    let outcome = match SessionState::derive(latest.as_ref()) {
        SessionState::NoSession => StatusOutcome::NotExisting,
        SessionState::LoggedIn => match latest {
            Some(row) => StatusOutcome::AlreadyLoggedIn(row),
            None => StatusOutcome::NotExisting,
        },
        SessionState::LoggedOut => match latest {
            Some(row) => StatusOutcome::LoggedOut(row),
            None => StatusOutcome::NotExisting,
        },
    };
    Ok(outcome)
}

/// Record a login, unless the visitor already has an open session today.
///
/// # Errors
///
/// [`SessionError::LoginRace`] when a concurrent login wins the insert;
/// [`SessionError::Database`] on storage failure.
pub async fn login(
    store: &SessionStore,
    visitor: Visitor<'_>,
    now: NaiveDateTime,
) -> Result<LoginOutcome> {
    if let Some(open) = store.open_for_day(visitor.email, now.date()).await? {
        return Ok(LoginOutcome::AlreadyLoggedIn(open));
    }

    let row = store
        .insert(NewSession {
            email: visitor.email,
            name: visitor.name,
            position: visitor.position,
            terms: visitor.terms,
            timein: now,
        })
        .await?;

    info!(email = %row.email, session_id = row.id, "Visitor logged in");
    Ok(LoginOutcome::Created(row))
}

/// Record a logout against today's open session.
///
/// # Errors
///
/// [`SessionError::NoActiveSession`] when today has neither an open nor a
/// closed session; [`SessionError::Database`] on storage failure.
pub async fn logout(
    store: &SessionStore,
    email: &str,
    resources: Option<&str>,
    feedback: Option<&str>,
    now: NaiveDateTime,
) -> Result<LogoutOutcome> {
    let today = now.date();

    let Some(open) = store.open_for_day(email, today).await? else {
        if let Some(closed) = store.latest_closed_for_day(email, today).await? {
            return Ok(LogoutOutcome::AlreadyLoggedOut(closed));
        }
        return Err(SessionError::NoActiveSession);
    };

    let row = store.close(open.id, resources, feedback, now).await?;
    info!(email = %row.email, session_id = row.id, "Visitor logged out");
    Ok(LogoutOutcome::Closed(row))
}
