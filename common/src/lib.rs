//! Shared plumbing for the coworkd HTTP services.
//!
//! Both backends are thin CRUD layers over a relational store; what they
//! share lives here:
//!
//! - [`error::AppError`] - the single error type handlers return, converted
//!   into the fixed `{"error": "..."}` JSON body at the response boundary.
//! - [`mailer`] - the outbound email seam: an SMTP implementation for
//!   production and a console implementation for development.

pub mod error;
pub mod mailer;

pub use error::AppError;
pub use mailer::{ConsoleMailer, MailError, Mailer, SmtpMailer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
