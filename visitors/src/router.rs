//! Router composition.
//!
//! # Routes
//!
//! - `POST /check-login-status` - which modal to show next
//! - `POST /login` / `POST /logout` - record check-in and check-out
//! - `GET /check-network` - CIDR allow-list gate
//! - `POST /reset-session-logs` - destructive bulk reset
//! - `GET /visits` - distinct-visitor count
//! - `GET /health`

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the CORS layer from the configured origins. The kiosk frontend is
/// served from anywhere on the local network, so the default is `*`.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Assemble the service router with tracing and CORS applied.
#[must_use]
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/check-login-status",
            post(handlers::sessions::check_login_status),
        )
        .route("/login", post(handlers::sessions::login))
        .route("/logout", post(handlers::sessions::logout))
        .route("/check-network", get(handlers::network::check_network))
        .route(
            "/reset-session-logs",
            post(handlers::sessions::reset_session_logs),
        )
        .route("/visits", get(handlers::visits::count_visits))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
