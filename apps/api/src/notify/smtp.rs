use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use uuid::Uuid;

use super::{parse_address, sender, MailError, MailTransport, OutgoingMail, Sent};
use crate::config::SmtpConfig;

/// Relays notifications through an authenticated SMTP server.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Address,
    to: Mailbox,
}

impl SmtpTransport {
    pub fn new(config: &SmtpConfig, from: &str, to: &str) -> Result<Self, MailError> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let mailer = builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        Ok(Self {
            mailer,
            from: parse_address(from)?,
            to: Mailbox::new(None, parse_address(to)?),
        })
    }

    fn build_message(&self, mail: OutgoingMail, message_id: &str) -> Result<Message, MailError> {
        let reply_to = Mailbox::new(None, parse_address(&mail.reply_to)?);

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(mail.html));
        for attachment in mail.attachments {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| MailError::Build(format!("{}: {e}", attachment.content_type)))?;
            body = body.singlepart(
                MailAttachment::new(attachment.filename)
                    .body(attachment.bytes.to_vec(), content_type),
            );
        }

        Message::builder()
            .from(sender(&mail.from_name, &self.from))
            .reply_to(reply_to)
            .to(self.to.clone())
            .subject(mail.subject)
            .message_id(Some(message_id.to_string()))
            .multipart(body)
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn provider(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, mail: OutgoingMail) -> Result<Sent, MailError> {
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.from.domain());
        let message = self.build_message(mail, &message_id)?;

        let response = self.mailer.send(message).await?;
        debug!(
            "SMTP accepted {message_id}: {}",
            response.message().collect::<Vec<_>>().join(" ")
        );

        Ok(Sent { message_id })
    }
}
