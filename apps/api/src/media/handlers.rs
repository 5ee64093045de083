use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::{read_single_file, MediaError};
use crate::errors::AppError;
use crate::state::AppState;

pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    /// Local filename or remote object key.
    pub filename: String,
    pub category: String,
}

/// POST /upload
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let multipart = multipart?;
    let form = read_single_file(multipart, UPLOAD_FIELD, state.max_upload_bytes).await?;
    let category = form.text("category").unwrap_or_else(|| "general".to_string());
    let file = form.file.ok_or(MediaError::MissingFile(UPLOAD_FIELD))?;
    file.require_image()?;

    let stored = state.media.store(&file).await?;
    info!(
        "Upload stored via {} backend: {}",
        state.media.backend(),
        stored.url
    );

    Ok(Json(UploadResponse {
        url: stored.url,
        filename: stored.id,
        category,
    }))
}
