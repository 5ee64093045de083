use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lettre::Address;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{parse_address, sender, MailError, MailTransport, OutgoingMail, Sent};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: String,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<ResendAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct ResendAttachment<'a> {
    filename: &'a str,
    content: String,
    content_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ResendError {
    message: String,
}

/// Sends notifications through the Resend transactional email API.
pub struct ResendTransport {
    client: Client,
    api_key: String,
    from: Address,
    to: String,
}

impl ResendTransport {
    pub fn new(api_key: &str, from: &str, to: &str) -> Result<Self, MailError> {
        let to = parse_address(to)?.to_string();
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            api_key: api_key.to_string(),
            from: parse_address(from)?,
            to,
        })
    }

    fn request<'a>(&'a self, mail: &'a OutgoingMail) -> SendRequest<'a> {
        SendRequest {
            from: sender(&mail.from_name, &self.from).to_string(),
            to: [self.to.as_str()],
            reply_to: mail.reply_to.as_str(),
            subject: mail.subject.as_str(),
            html: mail.html.as_str(),
            attachments: mail
                .attachments
                .iter()
                .map(|a| ResendAttachment {
                    filename: a.filename.as_str(),
                    content: STANDARD.encode(&a.bytes),
                    content_type: a.content_type.as_str(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl MailTransport for ResendTransport {
    fn provider(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, mail: OutgoingMail) -> Result<Sent, MailError> {
        parse_address(&mail.reply_to)?;

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&self.request(&mail))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ResendError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(MailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendResponse = response.json().await?;
        debug!("Resend accepted message {}", sent.id);
        Ok(Sent { message_id: sent.id })
    }
}
