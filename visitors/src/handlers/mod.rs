//! HTTP handlers.

pub mod network;
pub mod sessions;
pub mod visits;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

/// Liveness probe.
#[allow(clippy::unused_async)]
pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
