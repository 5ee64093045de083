use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use super::Deleted;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::{Image, ImageCategory, ImageInput};
use crate::state::AppState;
use crate::validation::parse_id;

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Image not found".to_string())
}

/// A filter naming no known category matches nothing.
async fn list_filtered(
    state: &AppState,
    category: Option<&str>,
) -> Result<Json<Vec<Image>>, AppError> {
    let category = match category.map(str::trim).filter(|c| !c.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<ImageCategory>() {
            Ok(c) => Some(c),
            Err(_) => return Ok(Json(Vec::new())),
        },
    };
    Ok(Json(state.store.list_images(category).await?))
}

/// GET /api/images[?category=]
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<Image>>, AppError> {
    list_filtered(&state, query.category.as_deref()).await
}

/// GET /api/images/:category
pub async fn list_images_in(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Image>>, AppError> {
    list_filtered(&state, Some(&category)).await
}

/// POST /api/images
pub async fn create_image(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ImageInput>,
) -> Result<(StatusCode, Json<Image>), AppError> {
    let image = state.store.insert_image(input.into_new()?).await?;
    info!("Created {} image {}", image.category, image.id);
    Ok((StatusCode::CREATED, Json(image)))
}

/// PUT /api/images/:id
pub async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ImageInput>,
) -> Result<Json<Image>, AppError> {
    let id = parse_id(&id, "image")?;
    let patch = input.into_patch()?;
    let image = state
        .store
        .update_image(id, patch)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(image))
}

/// DELETE /api/images/:id
///
/// The record goes first; a file that cannot be removed afterwards is logged
/// and left behind.
pub async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    let id = parse_id(&id, "image")?;
    let image = state.store.delete_image(id).await?.ok_or_else(not_found)?;

    match state.media.release(&image.src).await {
        Ok(true) => info!("Deleted image {id} and its file {}", image.src),
        Ok(false) => info!("Deleted image {id}"),
        Err(e) => warn!("Deleted image {id} but could not remove {}: {e}", image.src),
    }

    Ok(Json(Deleted::new("Image", id)))
}
