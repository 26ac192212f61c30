//! Venue-reservation booking API.
//!
//! A thin CRUD layer over SQLite: accounts with JWT bearer auth, a seeded
//! venue catalog, and conflict-checked bookings. The interesting part is the
//! [`ledger`], which owns the booking-window rules and the interval conflict
//! test; everything else is plumbing.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod router;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::ReservationError;
pub use router::router;
pub use state::AppState;
