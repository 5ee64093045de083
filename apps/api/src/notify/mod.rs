//! Outbound notification email for contact-form submissions and job
//! applications. One `MailTransport` capability, two providers.

pub mod handlers;
pub mod resend;
pub mod smtp;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use lettre::message::Mailbox;
use lettre::Address;
use thiserror::Error;
use tracing::info;

use crate::config::{MailConfig, MailProvider};

pub use resend::ResendTransport;
pub use smtp::SmtpTransport;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address '{0}'")]
    Address(String),

    #[error("Could not build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A notification addressed to the site owner. The transport supplies the
/// sender address and recipient; the message only names who it is from.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    /// Display name on the `From` header, normally the submitter's name.
    pub from_name: String,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

/// Provider acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub message_id: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn send(&self, mail: OutgoingMail) -> Result<Sent, MailError>;
}

/// Builds the transport named by the mail configuration.
pub fn build_transport(config: &MailConfig) -> Result<Arc<dyn MailTransport>, MailError> {
    let transport: Arc<dyn MailTransport> = match &config.provider {
        MailProvider::Resend { api_key } => {
            Arc::new(ResendTransport::new(api_key, &config.from, &config.to)?)
        }
        MailProvider::Smtp(smtp) => Arc::new(SmtpTransport::new(smtp, &config.from, &config.to)?),
    };
    info!(
        "Email notifications enabled via {} (to {})",
        transport.provider(),
        config.to
    );
    Ok(transport)
}

pub(crate) fn parse_address(raw: &str) -> Result<Address, MailError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|_| MailError::Address(raw.to_string()))
}

/// The configured sender address under the submitter's display name.
pub(crate) fn sender(from_name: &str, from: &Address) -> Mailbox {
    let name = from_name.trim();
    Mailbox::new((!name.is_empty()).then(|| name.to_string()), from.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_quotes_display_name() {
        let from = parse_address("bot@example.com").unwrap();
        let mailbox = sender("Doe, Jane", &from);
        assert_eq!(mailbox.to_string(), "\"Doe, Jane\" <bot@example.com>");
    }

    #[test]
    fn test_blank_display_name_is_dropped() {
        let from = parse_address("bot@example.com").unwrap();
        assert_eq!(sender("  ", &from).to_string(), "bot@example.com");
    }

    #[test]
    fn test_parse_address_rejects_garbage() {
        assert!(matches!(
            parse_address("not an address"),
            Err(MailError::Address(_))
        ));
    }
}
