//! Check-in and check-out endpoints.
//!
//! `already_logged_in` and `already_logged_out` are 200 responses, not
//! errors: the kiosk treats them as ordinary outcomes and just switches
//! modals.

use crate::error::SessionError;
use crate::models::{iso, twelve_hour};
use crate::sessions::{self, LoginOutcome, LogoutOutcome, StatusOutcome, Visitor};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{Local, NaiveDateTime, SubsecRound};
use coworkd_common::WebResult;
use serde::Deserialize;
use serde_json::{Value, json};

fn now() -> NaiveDateTime {
    // Second precision: SQLite's date() functions must be able to read the
    // stored text back.
    Local::now().naive_local().trunc_subsecs(0)
}

/// The empty string counts as missing, like the kiosk's blank inputs.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// `POST /check-login-status` request body.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Visitor email.
    pub email: Option<String>,
}

/// `POST /check-login-status` - which modal should the kiosk show next.
pub async fn check_login_status(
    State(state): State<AppState>,
    Json(req): Json<StatusRequest>,
) -> WebResult<Json<Value>> {
    let email = non_empty(req.email).ok_or(SessionError::EmailRequired)?;

    let body = match sessions::check_status(&state.sessions, &email, now()).await? {
        StatusOutcome::NotExisting => json!({
            "status": "not_existing",
            "next_modal": "login",
            "message": "No session found for today. Please log in to start your session.",
        }),
        StatusOutcome::AlreadyLoggedIn(row) => json!({
            "status": "email_already_logged_in",
            "next_modal": "logout",
            "message": "You are already logged in today. Please proceed to log out.",
            "session_id": row.id,
            "timein": row.timein.map(iso),
        }),
        StatusOutcome::LoggedOut(row) => {
            let logout_label = row
                .timeout
                .map_or_else(|| "N/A".to_string(), twelve_hour);
            json!({
                "status": "logged_out",
                "next_modal": "login",
                "message": format!(
                    "You are logged out. Last logout was at {logout_label}. You may log in again."
                ),
                "session_id": row.id,
                "logout_time": row.timeout.map(iso),
            })
        }
    };
    Ok(Json(body))
}

/// `POST /login` request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Visitor email.
    pub email: Option<String>,
    /// Visitor name.
    pub name: Option<String>,
    /// Reported position.
    pub position: Option<String>,
    /// Terms acknowledgement; must be present, either value.
    pub terms: Option<bool>,
}

/// `POST /login` - record a check-in.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> WebResult<(StatusCode, Json<Value>)> {
    let email = non_empty(req.email).ok_or(SessionError::MissingFields)?;
    let name = non_empty(req.name).ok_or(SessionError::MissingFields)?;
    let position = non_empty(req.position).ok_or(SessionError::MissingFields)?;
    let terms = req.terms.ok_or(SessionError::MissingFields)?;

    let visitor = Visitor {
        email: &email,
        name: &name,
        position: &position,
        terms,
    };

    let response = match sessions::login(&state.sessions, visitor, now()).await? {
        LoginOutcome::AlreadyLoggedIn(row) => {
            let timein_label = row
                .timein
                .map_or_else(|| "N/A".to_string(), twelve_hour);
            (
                StatusCode::OK,
                Json(json!({
                    "status": "already_logged_in",
                    "message": format!(
                        "User already logged in today at {timein_label}. Please log out first."
                    ),
                    "session_id": row.id,
                    "timein": row.timein.map(iso),
                })),
            )
        }
        LoginOutcome::Created(row) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "message": "User login recorded.",
                "session_id": row.id,
            })),
        ),
    };
    Ok(response)
}

/// `POST /logout` request body.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    /// Visitor email.
    pub email: Option<String>,
    /// Resources the visitor used.
    pub resources: Option<String>,
    /// Free-text feedback.
    pub feedback: Option<String>,
}

/// `POST /logout` - record a check-out.
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<LogoutRequest>,
) -> WebResult<Json<Value>> {
    let email = non_empty(req.email).ok_or(SessionError::EmailRequired)?;

    let body = match sessions::logout(
        &state.sessions,
        &email,
        req.resources.as_deref(),
        req.feedback.as_deref(),
        now(),
    )
    .await?
    {
        LogoutOutcome::Closed(row) => json!({
            "status": "success",
            "message": "User logged out successfully.",
            "session_id": row.id,
            "timeout": row.timeout.map(iso),
        }),
        LogoutOutcome::AlreadyLoggedOut(row) => {
            let timeout_label = row
                .timeout
                .map_or_else(|| "unknown time".to_string(), twelve_hour);
            json!({
                "status": "already_logged_out",
                "message": format!("You have already logged out today at {timeout_label}."),
                "session_id": row.id,
                "timeout": row.timeout.map(iso),
            })
        }
    };
    Ok(Json(body))
}

/// `POST /reset-session-logs` - wipe every session row and restart ids at 1.
pub async fn reset_session_logs(State(state): State<AppState>) -> WebResult<Json<Value>> {
    state.sessions.reset().await?;
    Ok(Json(json!({
        "status": "success",
        "message": "All session logs deleted and ID sequence reset to 1.",
    })))
}
