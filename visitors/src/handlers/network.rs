//! The WiFi gate.

use crate::network::{is_allowed, raw_client_ip};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use std::net::IpAddr;
use tracing::debug;

/// `GET /check-network` - is the caller on an allowed network?
///
/// The body shape is the kiosk's, not the error envelope: it always carries
/// `connected` plus a message, whatever the status code.
#[allow(clippy::unused_async)]
pub async fn check_network(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    // Direct connections carry no proxy headers; treat them as loopback.
    let raw = raw_client_ip(&headers).unwrap_or_else(|| "127.0.0.1".to_string());
    debug!(client_ip = %raw, "Network check");

    let Ok(ip) = raw.parse::<IpAddr>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "connected": false,
                "message": "Invalid IP address.",
            })),
        );
    };

    if is_allowed(ip, &state.config.allowed_networks) {
        (
            StatusCode::OK,
            Json(json!({
                "connected": true,
                "message": format!("Connected to allowed network ({ip})."),
            })),
        )
    } else {
        (
            StatusCode::FORBIDDEN,
            Json(json!({
                "connected": false,
                "message": format!(
                    "Access denied. Connect to the co-working space WiFi. Your IP: {ip}"
                ),
            })),
        )
    }
}
