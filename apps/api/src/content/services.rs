use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::Deleted;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::{Service, ServiceInput};
use crate::state::AppState;
use crate::validation::parse_id;

fn not_found() -> AppError {
    AppError::NotFound("Service not found".to_string())
}

/// GET /api/services
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<Service>>, AppError> {
    Ok(Json(state.store.list_services().await?))
}

/// POST /api/services
pub async fn create_service(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    let service = state.store.insert_service(input.into_new()?).await?;
    info!("Created service {}", service.id);
    Ok((StatusCode::CREATED, Json(service)))
}

/// PUT /api/services/:id
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> Result<Json<Service>, AppError> {
    let id = parse_id(&id, "service")?;
    let patch = input.into_patch()?;
    let service = state
        .store
        .update_service(id, patch)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(service))
}

/// DELETE /api/services/:id
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    let id = parse_id(&id, "service")?;
    state.store.delete_service(id).await?.ok_or_else(not_found)?;
    info!("Deleted service {id}");
    Ok(Json(Deleted::new("Service", id)))
}
