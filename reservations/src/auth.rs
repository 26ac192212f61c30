//! Password hashing and bearer-token handling.
//!
//! Passwords are stored as Argon2 hashes; sessions are stateless JWTs whose
//! `sub` claim is the user's row id. The [`AuthClaims`] extractor rejects a
//! request before the handler body runs when the token is missing or bad.

use crate::error::{ReservationError, Result};
use crate::state::AppState;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use coworkd_common::AppError;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims carried by every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User row id.
    pub sub: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Hash a plaintext password with a fresh salt.
///
/// # Errors
///
/// Returns [`ReservationError::Hashing`] if the hasher fails; the cause is
/// not surfaced.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ReservationError::Hashing)
}

/// Verify a plaintext password against a stored hash.
///
/// An unparseable stored hash counts as a failed verification, not an
/// internal error.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Mint a signed token for a user.
///
/// # Errors
///
/// Returns [`ReservationError::Hashing`] if encoding fails (it only can on a
/// malformed key).
pub fn mint_token(user_id: i64, secret: &str, ttl_hours: i64) -> Result<String> {
    let claims = Claims {
        sub: user_id,
        exp: (Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp(),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ReservationError::Hashing)
}

/// Decode and validate a token, returning its claims.
///
/// # Errors
///
/// Returns [`ReservationError::Unauthorized`] for anything wrong with the
/// token: bad signature, expired, malformed.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ReservationError::Unauthorized)
}

/// Claims extracted from the `Authorization: Bearer` header.
///
/// Handlers that need the caller's identity take this as an argument;
/// requests without a valid token never reach them.
#[derive(Debug, Clone, Copy)]
pub struct AuthClaims {
    /// Authenticated user id.
    pub user_id: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ReservationError::Unauthorized)?;

        let claims = verify_token(token, &state.config.jwt_secret)?;
        Ok(Self {
            user_id: claims.sub,
        })
    }
}
