//! Signup and login.

use crate::auth::{hash_password, mint_token, verify_password};
use crate::error::ReservationError;
use crate::models::{AuthResponse, LoginRequest, SignupRequest, UserPayload};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use coworkd_common::WebResult;
use tracing::info;

/// `POST /signup` - create an account and hand back a token.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> WebResult<Json<AuthResponse>> {
    let password_hash = hash_password(&req.password)?;
    let user = state
        .users
        .create(&req.email, &password_hash, &req.name, req.is_admin)
        .await?;

    let access_token = mint_token(user.id, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;

    info!(email = %user.email, "User signed up");
    Ok(Json(AuthResponse {
        user: UserPayload::from(&user),
        access_token,
    }))
}

/// `POST /login` - verify credentials and hand back a token.
///
/// Unknown email and wrong password produce the same 401; the endpoint
/// does not confirm which emails exist.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> WebResult<Json<AuthResponse>> {
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(ReservationError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ReservationError::InvalidCredentials.into());
    }

    let access_token = mint_token(user.id, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;

    Ok(Json(AuthResponse {
        user: UserPayload::from(&user),
        access_token,
    }))
}
