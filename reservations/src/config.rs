//! Service configuration.
//!
//! All values come from the environment, with development defaults so a bare
//! `cargo run` works against a local SQLite file.

use std::env;
use tracing::warn;

/// Default token lifetime, matching the legacy deployment.
const DEFAULT_JWT_TTL_HOURS: i64 = 24;

/// Runtime configuration for the booking service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address, e.g. `0.0.0.0:5000`.
    pub bind_addr: String,

    /// SQLite connection string.
    pub database_url: String,

    /// Origins allowed by CORS. `*` means any origin.
    pub cors_origins: Vec<String>,

    /// HMAC secret for signing tokens.
    pub jwt_secret: String,

    /// Token lifetime in hours.
    pub jwt_ttl_hours: i64,
}

impl Config {
    /// Load configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using an insecure development secret");
            "coworkd-dev-secret".to_string()
        });

        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:5000"),
            database_url: env_or("DATABASE_URL", "sqlite://reservations.db?mode=rwc"),
            cors_origins: env_or("CORS_ORIGINS", "http://localhost:3000,http://localhost:5173")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            jwt_secret,
            jwt_ttl_hours: env_or("JWT_TTL_HOURS", "24").parse().unwrap_or_else(|e| {
                warn!("Invalid JWT_TTL_HOURS: {e}, using default");
                DEFAULT_JWT_TTL_HOURS
            }),
        }
    }

    /// Replace the signing secret.
    #[must_use]
    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    /// Replace the token lifetime.
    #[must_use]
    pub const fn with_jwt_ttl_hours(mut self, hours: i64) -> Self {
        self.jwt_ttl_hours = hours;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            database_url: "sqlite://reservations.db?mode=rwc".to_string(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            jwt_secret: "coworkd-dev-secret".to_string(),
            jwt_ttl_hours: DEFAULT_JWT_TTL_HOURS,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
