use axum::extract::{Path, State};
use axum::Json;
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::page::validate_page_id;
use crate::models::PageInput;
use crate::state::AppState;

/// GET /api/pages/:pageId
///
/// A page nobody has saved yet has empty content, not a 404.
pub async fn get_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let page_id = validate_page_id(&page_id)?;
    let content = state
        .store
        .get_page(page_id)
        .await?
        .map(|page| page.content)
        .unwrap_or_default();
    Ok(Json(content))
}

/// POST /api/pages/:pageId
pub async fn save_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
    ApiJson(input): ApiJson<PageInput>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let page_id = validate_page_id(&page_id)?;
    let update = input.into_update()?;
    let page = state.store.upsert_page(page_id, update).await?;
    info!("Saved content for page '{}' ({} keys)", page.page_id, page.content.len());
    Ok(Json(page.content))
}
