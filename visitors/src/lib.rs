//! Visitor check-in/check-out tracker.
//!
//! Records one session row per check-in, keyed by email only; visitors are
//! not pre-registered. The [`sessions`] module owns the per-day state
//! machine, [`jobs`] the scheduled CSV export and email reporting.

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod network;
pub mod router;
pub mod sessions;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::SessionError;
pub use router::router;
pub use state::AppState;
