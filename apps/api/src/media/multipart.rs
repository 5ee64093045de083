use std::collections::HashMap;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::BytesMut;

use super::{MediaError, UploadedFile};

/// A multipart body holding at most one file, under a fixed field name,
/// plus any number of text fields.
#[derive(Debug, Default)]
pub struct SingleFileForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl SingleFileForm {
    /// Trimmed text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Reads the whole body, buffering the file in memory. Stops as soon as the
/// file grows past `max_bytes`.
pub async fn read_single_file(
    mut multipart: Multipart,
    file_field: &'static str,
    max_bytes: usize,
) -> Result<SingleFileForm, MediaError> {
    let mut form = SingleFileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_none() {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(e, max_bytes))?;
            form.fields.insert(name, value);
            continue;
        }

        if name != file_field {
            return Err(MediaError::Malformed(format!(
                "unexpected file field '{name}', expected '{file_field}'"
            )));
        }
        if form.file.is_some() {
            return Err(MediaError::Malformed(format!(
                "only one file may be sent under '{file_field}'"
            )));
        }
        form.file = Some(read_file(field, max_bytes).await?);
    }

    Ok(form)
}

async fn read_file(mut field: Field<'_>, max_bytes: usize) -> Result<UploadedFile, MediaError> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);

    let mut buf = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if buf.len() + chunk.len() > max_bytes {
            return Err(MediaError::TooLarge { limit: max_bytes });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes: buf.freeze(),
    })
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> MediaError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return MediaError::TooLarge { limit: max_bytes };
    }
    MediaError::Malformed(err.body_text())
}
