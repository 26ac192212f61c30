//! Service configuration.
//!
//! Everything comes from the environment. Mail credentials are optional: the
//! service runs without them, it just cannot deliver reports and says so in
//! the logs.

use ipnet::IpNet;
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Runtime configuration for the visitor service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address, e.g. `0.0.0.0:5001`.
    pub bind_addr: String,

    /// SQLite connection string.
    pub database_url: String,

    /// Origins allowed by CORS. `*` means any origin.
    pub cors_origins: Vec<String>,

    /// Networks the kiosk may be used from.
    pub allowed_networks: Vec<IpNet>,

    /// SMTP server for report delivery.
    pub smtp_server: String,

    /// SMTP port (465 for implicit TLS).
    pub smtp_port: u16,

    /// Report sender address; also the SMTP username.
    pub email_sender: Option<String>,

    /// SMTP password.
    pub email_password: Option<String>,

    /// Where daily and monthly reports are mailed to.
    pub report_recipient: String,

    /// Directory daily CSV files are written to until delivered.
    pub export_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:5001"),
            database_url: env_or("DATABASE_URL", "sqlite://visitors.db?mode=rwc"),
            cors_origins: env_or("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            allowed_networks: parse_networks(&env_or("ALLOWED_NETWORKS", "192.168.0.0/24")),
            smtp_server: env_or("SMTP_SERVER", "smtp.gmail.com"),
            smtp_port: env_or("SMTP_PORT", "465").parse().unwrap_or_else(|e| {
                warn!("Invalid SMTP_PORT: {e}, using 465");
                465
            }),
            email_sender: env::var("EMAIL_SENDER").ok(),
            email_password: env::var("EMAIL_PASSWORD").ok(),
            report_recipient: env_or("REPORT_RECIPIENT", "facilities@example.com"),
            export_dir: PathBuf::from(env_or("EXPORT_DIR", "exports")),
        }
    }

    /// Both mail credentials, when configured.
    #[must_use]
    pub fn mail_credentials(&self) -> Option<(String, String)> {
        match (&self.email_sender, &self.email_password) {
            (Some(sender), Some(password)) => Some((sender.clone(), password.clone())),
            _ => None,
        }
    }

    /// Replace the export directory.
    #[must_use]
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Replace the network allow-list.
    #[must_use]
    pub fn with_allowed_networks(mut self, networks: Vec<IpNet>) -> Self {
        self.allowed_networks = networks;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5001".to_string(),
            database_url: "sqlite://visitors.db?mode=rwc".to_string(),
            cors_origins: vec!["*".to_string()],
            allowed_networks: parse_networks("192.168.0.0/24"),
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            email_sender: None,
            email_password: None,
            report_recipient: "facilities@example.com".to_string(),
            export_dir: PathBuf::from("exports"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_networks(spec: &str) -> Vec<IpNet> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(net) => Some(net),
            Err(e) => {
                warn!("Ignoring unparseable network {s:?}: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.allowed_networks.len(), 1);
        assert_eq!(config.smtp_port, 465);
        assert!(config.mail_credentials().is_none());
    }

    #[test]
    fn test_mail_credentials_require_both() {
        let mut config = Config::default();
        config.email_sender = Some("reports@example.com".to_string());
        assert!(config.mail_credentials().is_none());
        config.email_password = Some("secret".to_string());
        assert_eq!(
            config.mail_credentials(),
            Some(("reports@example.com".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn test_parse_networks_skips_garbage() {
        let nets = parse_networks("192.168.0.0/24, bogus, 10.0.0.0/8");
        assert_eq!(nets.len(), 2);
    }
}
