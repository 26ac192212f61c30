//! Router composition.
//!
//! # Routes
//!
//! - `POST /signup` / `POST /login` - accounts and tokens
//! - `GET /venues`, `GET /venues/:id`, `GET /venues/:id/availability`
//! - `POST|GET /reservations`, `GET|DELETE /reservations/:id`,
//!   `PUT /reservations/:id/attendance`
//! - `GET /health`

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the CORS layer from the configured origins. A literal `*` opens
/// the service to any origin.
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
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/venues", get(handlers::venues::list))
        .route("/venues/:id", get(handlers::venues::get))
        .route(
            "/venues/:id/availability",
            get(handlers::venues::availability),
        )
        .route(
            "/reservations",
            post(handlers::reservations::create).get(handlers::reservations::list),
        )
        .route(
            "/reservations/:id",
            get(handlers::reservations::get).delete(handlers::reservations::delete),
        )
        .route(
            "/reservations/:id/attendance",
            put(handlers::reservations::set_attendance),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
