use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::media::MediaError;
use crate::notify::MailError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Deliberately carries no detail: unknown account and wrong password
    /// must be indistinguishable to the caller.
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("{message}: {details}")]
    Upstream { message: String, details: String },

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream { .. } | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut details = None;

        let (code, message) = match &self {
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {msg}");
                ("NOT_FOUND", msg.clone())
            }
            AppError::Validation(msg) => {
                tracing::warn!("Validation error: {msg}");
                ("VALIDATION_ERROR", msg.clone())
            }
            AppError::Conflict(msg) => {
                tracing::warn!("Conflict: {msg}");
                ("CONFLICT", msg.clone())
            }
            AppError::Unauthorized => ("INVALID_CREDENTIALS", "Invalid credentials".to_string()),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {msg}");
                ("SERVICE_UNAVAILABLE", msg.clone())
            }
            AppError::Upstream {
                message,
                details: d,
            } => {
                tracing::error!("Upstream failure: {message}: {d}");
                details = Some(d.clone());
                ("UPSTREAM_ERROR", message.clone())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                ("DATABASE_ERROR", "A database error occurred".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => AppError::Conflict(msg),
            other => AppError::Store(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort(_) => AppError::Validation(err.to_string()),
            PasswordError::Hash(_) | PasswordError::Join(_) => AppError::Internal(err.into()),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::MissingFile(_)
            | MediaError::TooLarge { .. }
            | MediaError::UnsupportedType(_)
            | MediaError::Malformed(_) => AppError::Validation(err.to_string()),
            MediaError::Io(e) => {
                tracing::error!("Upload storage I/O failure: {e}");
                AppError::ServiceUnavailable("Upload storage is unavailable".to_string())
            }
            MediaError::Remote(msg) => {
                tracing::error!("Remote media host failure: {msg}");
                AppError::ServiceUnavailable("Upload storage is unavailable".to_string())
            }
        }
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        AppError::Upstream {
            message: "Failed to send email".to_string(),
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_maps_to_400_with_error_field() {
        let (status, body) = body_json(AppError::validation("src is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "src is required");
    }

    #[tokio::test]
    async fn test_duplicate_store_key_is_a_400_conflict() {
        let err: AppError = StoreError::Duplicate("email already registered".into()).into();
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_upstream_passes_details_through() {
        let (status, body) = body_json(AppError::Upstream {
            message: "Failed to send email".into(),
            details: "535 authentication failed".into(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "535 authentication failed");
    }

    #[tokio::test]
    async fn test_unauthorized_hides_cause() {
        let (status, body) = body_json(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid credentials");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_media_io_failure_is_service_unavailable() {
        let err: AppError = MediaError::Io(std::io::Error::other("disk gone")).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
