use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::Deleted;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::{Job, JobInput};
use crate::state::AppState;
use crate::validation::parse_id;

/// GET /api/jobs
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.store.list_jobs().await?))
}

/// POST /api/jobs
pub async fn create_job(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<JobInput>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = state.store.insert_job(input.into_new()?).await?;
    info!("Created job {} ({})", job.id, job.title);
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/jobs/:id
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<JobInput>,
) -> Result<Json<Job>, AppError> {
    let id = parse_id(&id, "job")?;
    let patch = input.into_patch()?;
    let job = state
        .store
        .update_job(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    Ok(Json(job))
}

/// DELETE /api/jobs/:id
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    let id = parse_id(&id, "job")?;
    state
        .store
        .delete_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    info!("Deleted job {id}");
    Ok(Json(Deleted::new("Job", id)))
}
