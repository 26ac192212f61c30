//! Booking CRUD.

use crate::auth::AuthClaims;
use crate::error::ReservationError;
use crate::ledger;
use crate::models::{AttendanceRequest, CreateReservationRequest, ReservationResponse, User};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use coworkd_common::WebResult;
use serde_json::{Value, json};

/// Resolve the token's user, rejecting tokens whose account is gone.
async fn current_user(state: &AppState, claims: AuthClaims) -> Result<User, ReservationError> {
    state
        .users
        .find_by_id(claims.user_id)
        .await?
        .ok_or(ReservationError::Unauthorized)
}

/// `POST /reservations` - create a booking.
pub async fn create(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(req): Json<CreateReservationRequest>,
) -> WebResult<Json<Value>> {
    let user = current_user(&state, claims).await?;
    let row = ledger::create(&state.reservations, &user, &req).await?;
    Ok(Json(
        json!({ "reservation": ReservationResponse::from(row) }),
    ))
}

/// `GET /reservations` - own bookings, or all of them for admins.
pub async fn list(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> WebResult<Json<Vec<ReservationResponse>>> {
    let user = current_user(&state, claims).await?;
    let rows = ledger::list(&state.reservations, &user).await?;
    Ok(Json(rows.into_iter().map(ReservationResponse::from).collect()))
}

/// `GET /reservations/{id}` - one booking, owner or admin.
pub async fn get(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<i64>,
) -> WebResult<Json<ReservationResponse>> {
    let user = current_user(&state, claims).await?;
    let row = ledger::get(&state.reservations, &user, id).await?;
    Ok(Json(ReservationResponse::from(row)))
}

/// `DELETE /reservations/{id}` - remove a booking, owner or admin.
pub async fn delete(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<i64>,
) -> WebResult<Json<Value>> {
    let user = current_user(&state, claims).await?;
    ledger::delete(&state.reservations, &user, id).await?;
    Ok(Json(json!({ "success": true })))
}

/// `PUT /reservations/{id}/attendance` - overwrite the attendance list,
/// admin only.
pub async fn set_attendance(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<i64>,
    Json(req): Json<AttendanceRequest>,
) -> WebResult<Json<Value>> {
    let user = current_user(&state, claims).await?;
    ledger::set_attendance(&state.reservations, &user, id, &req.attendance).await?;
    Ok(Json(json!({ "success": true })))
}
