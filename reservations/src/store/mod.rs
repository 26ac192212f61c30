//! SQLite repositories.
//!
//! One store per table, each a thin wrapper around the shared pool. All SQL
//! lives here; the ledger and handlers never touch the pool directly.

mod reservations;
mod users;
mod venues;

pub use reservations::{NewReservation, ReservationStore};
pub use users::UserStore;
pub use venues::VenueStore;
