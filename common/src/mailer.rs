//! Outbound email providers.
//!
//! The services never talk SMTP directly; they go through the [`Mailer`]
//! trait so report jobs can be exercised in tests without a mail server.
//! [`SmtpMailer`] sends real mail via Lettre, [`ConsoleMailer`] logs instead.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::info;

/// Errors raised while composing or delivering mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// A sender or recipient address did not parse.
    #[error("Invalid mail address: {0}")]
    Address(String),

    /// The message itself could not be built.
    #[error("Failed to build email: {0}")]
    Message(String),

    /// The SMTP conversation failed.
    #[error("SMTP transport error: {0}")]
    Transport(String),

    /// The blocking send task was cancelled or panicked.
    #[error("Email task failed: {0}")]
    Task(String),
}

/// Outbound email seam.
///
/// Implementations must be cheap to clone behind an `Arc`; the visitor
/// service hands one to its scheduled jobs.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a plain-text message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if the message cannot be composed or delivered.
    async fn send_text(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;

    /// Send a plain-text message with a single file attachment.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if the message cannot be composed or delivered.
    async fn send_with_attachment(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<(), MailError>;
}

/// SMTP mailer using Lettre.
///
/// # Configuration
///
/// - `smtp_server`: SMTP server address (e.g., "smtp.gmail.com")
/// - `smtp_port`: SMTP server port (465 for implicit TLS, 587 for STARTTLS)
/// - `smtp_username` / `smtp_password`: SMTP authentication
/// - `from_email` / `from_name`: sender address and display name
#[derive(Clone)]
pub struct SmtpMailer {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer.
    #[must_use]
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: String,
        smtp_password: String,
        from_email: String,
        from_name: String,
    ) -> Self {
        let credentials = Credentials::new(smtp_username, smtp_password);

        Self {
            smtp_server,
            smtp_port,
            credentials,
            from_email,
            from_name,
        }
    }

    /// Build SMTP transport for sending emails.
    ///
    /// Creates a new transport for each email to avoid connection pooling
    /// issues.
    fn build_transport(&self) -> Result<SmtpTransport, MailError> {
        let transport = SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build();
        Ok(transport)
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    fn message_builder(
        &self,
        to: &str,
        subject: &str,
    ) -> Result<lettre::message::MessageBuilder, MailError> {
        let builder = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| MailError::Address(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailError::Address(format!("Invalid to address: {e}")))?)
            .subject(subject);
        Ok(builder)
    }

    async fn deliver(&self, email: Message) -> Result<(), MailError> {
        let mailer = self.build_transport()?;

        // Lettre's SMTP transport is blocking; keep it off the runtime.
        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| MailError::Transport(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| MailError::Task(e.to_string()))?
        .map(|_| ())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_text(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let email = self
            .message_builder(to, subject)?
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Message(e.to_string()))?;

        self.deliver(email).await
    }

    async fn send_with_attachment(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<(), MailError> {
        let content_type = ContentType::parse("text/csv")
            .map_err(|e| MailError::Message(format!("Invalid attachment content type: {e}")))?;
        let attachment =
            Attachment::new(filename.to_string()).body(Body::new(content), content_type);

        let email = self
            .message_builder(to, subject)?
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body.to_string()))
                    .singlepart(attachment),
            )
            .map_err(|e| MailError::Message(e.to_string()))?;

        self.deliver(email).await
    }
}

/// Console mailer for development.
///
/// Logs the message instead of sending it, so the services can run without
/// SMTP credentials.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Create a new console mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send_text(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        info!(to = %to, subject = %subject, "📧 Email (development mode)");
        println!("\n--- EMAIL ---\nTo: {to}\nSubject: {subject}\n\n{body}\n--- END ---\n");
        Ok(())
    }

    async fn send_with_attachment(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<(), MailError> {
        info!(
            to = %to,
            subject = %subject,
            attachment = %filename,
            bytes = content.len(),
            "📧 Email with attachment (development mode)"
        );
        println!(
            "\n--- EMAIL ---\nTo: {to}\nSubject: {subject}\nAttachment: {filename} ({} bytes)\n\n{body}\n--- END ---\n",
            content.len()
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header_format() {
        let mailer = SmtpMailer::new(
            "smtp.example.com".to_string(),
            465,
            "user".to_string(),
            "secret".to_string(),
            "reports@example.com".to_string(),
            "Coworkd Reports".to_string(),
        );
        assert_eq!(mailer.from_header(), "Coworkd Reports <reports@example.com>");
    }

    #[test]
    fn test_invalid_recipient_is_rejected_before_send() {
        let mailer = SmtpMailer::new(
            "smtp.example.com".to_string(),
            465,
            "user".to_string(),
            "secret".to_string(),
            "reports@example.com".to_string(),
            "Coworkd Reports".to_string(),
        );
        let err = mailer.message_builder("not an address", "subject").unwrap_err();
        assert!(matches!(err, MailError::Address(_)));
    }

    #[tokio::test]
    async fn test_console_mailer_always_succeeds() {
        let mailer = ConsoleMailer::new();
        mailer
            .send_text("dev@example.com", "hello", "body")
            .await
            .unwrap();
        mailer
            .send_with_attachment("dev@example.com", "hello", "body", "x.csv", vec![1, 2, 3])
            .await
            .unwrap();
    }
}
