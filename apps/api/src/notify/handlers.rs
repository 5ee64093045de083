use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::templates::{self, ApplicationDetails, ContactDetails};
use super::{Attachment, MailTransport, OutgoingMail};
use crate::errors::AppError;
use crate::extract::JsonOrForm;
use crate::media::{read_single_file, MediaError, MediaStorage, UploadedFile};
use crate::state::AppState;
use crate::validation::{is_valid_email, Required};

pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub business_name: Option<String>,
    pub phone_number: Option<String>,
    pub how_can_we_help: Option<String>,
    pub best_time_to_contact: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentResponse {
    pub message: &'static str,
    pub message_id: String,
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn require_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        return Ok(());
    }
    Err(AppError::validation("Please provide a valid email address"))
}

/// The submission passed validation but there is nobody to tell about it.
fn configured_mailer(state: &AppState) -> Result<&Arc<dyn MailTransport>, AppError> {
    state.mailer.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable(
            "Email service is not configured. Your submission was received but no notification was sent"
                .to_string(),
        )
    })
}

/// POST /api/contact
pub async fn handle_contact(
    State(state): State<AppState>,
    JsonOrForm(form): JsonOrForm<ContactForm>,
) -> Result<Json<SentResponse>, AppError> {
    let mut required = Required::new();
    let name = required.take("name", form.name.clone());
    let email = required.take("email", form.email.clone());
    required.finish()?;
    require_email(&email)?;

    info!("Contact form submission from {email}");
    let mailer = configured_mailer(&state)?;

    let html = templates::contact_email(&ContactDetails {
        name: &name,
        email: &email,
        business_name: blank_to_none(&form.business_name),
        phone_number: blank_to_none(&form.phone_number),
        how_can_we_help: blank_to_none(&form.how_can_we_help),
        best_time_to_contact: blank_to_none(&form.best_time_to_contact),
        message: blank_to_none(&form.message),
    });

    let sent = mailer
        .send(OutgoingMail {
            subject: templates::contact_subject(&name),
            from_name: name,
            reply_to: email,
            html,
            attachments: Vec::new(),
        })
        .await?;
    info!("Contact email sent via {}: {}", mailer.provider(), sent.message_id);

    Ok(Json(SentResponse {
        message: "Email sent successfully",
        message_id: sent.message_id,
    }))
}

/// POST /api/career/apply
pub async fn handle_career_apply(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SentResponse>, AppError> {
    let form = read_single_file(multipart?, RESUME_FIELD, state.max_upload_bytes).await?;

    let mut required = Required::new();
    let name = required.take("name", form.text("name"));
    let email = required.take("email", form.text("email"));
    required.finish()?;
    require_email(&email)?;
    let phone = form.text("phone");
    let job_title = form.text("jobTitle");
    let resume = form
        .file
        .filter(|f| !f.bytes.is_empty())
        .ok_or(MediaError::MissingFile(RESUME_FIELD))?;

    info!(
        "Job application from {email} for {}",
        job_title.as_deref().unwrap_or("an unspecified role")
    );

    if let Some(archive) = &state.resume_archive {
        archive_resume(archive.as_ref(), &resume).await;
    }

    let mailer = configured_mailer(&state)?;

    let html = templates::application_email(&ApplicationDetails {
        name: &name,
        email: &email,
        phone: phone.as_deref(),
        job_title: job_title.as_deref(),
    });

    let sent = mailer
        .send(OutgoingMail {
            subject: templates::application_subject(job_title.as_deref(), &name),
            from_name: name,
            reply_to: email,
            html,
            attachments: vec![resume_attachment(resume)],
        })
        .await?;
    info!(
        "Application email sent via {}: {}",
        mailer.provider(),
        sent.message_id
    );

    Ok(Json(SentResponse {
        message: "Application sent successfully",
        message_id: sent.message_id,
    }))
}

/// Archiving is best effort. The email still goes out if the disk write fails.
async fn archive_resume(archive: &dyn MediaStorage, resume: &UploadedFile) {
    match archive.store(resume).await {
        Ok(stored) => info!("Resume archived as {}", stored.id),
        Err(e) => warn!("Could not archive resume: {e}"),
    }
}

fn resume_attachment(file: UploadedFile) -> Attachment {
    Attachment {
        filename: file
            .file_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "resume".to_string()),
        content_type: file
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        bytes: file.bytes,
    }
}
