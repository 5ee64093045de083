use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::password::verify_password_async;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::models::user::normalize_email;
use crate::models::{NewUser, PublicUser};
use crate::state::AppState;
use crate::validation::Required;

#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: PublicUser,
}

fn required_credentials(body: Credentials) -> Result<(String, String), AppError> {
    let mut required = Required::new();
    let email = required.take("email", body.email);
    let password = required.take_untrimmed("password", body.password);
    required.finish()?;
    Ok((email, password))
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let (email, password) = required_credentials(body)?;

    if state
        .store
        .find_user_by_email(&normalize_email(&email))
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    // The unique index still decides concurrent registrations.
    let user = state
        .store
        .insert_user(NewUser::from_plaintext(&email, password).await?)
        .await?;
    info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully",
            user: PublicUser::from(&user),
        }),
    ))
}

/// POST /api/login
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<Json<AuthResponse>, AppError> {
    let (email, password) = required_credentials(body)?;

    let Some(user) = state
        .store
        .find_user_by_email(&normalize_email(&email))
        .await?
    else {
        warn!("Login attempt for unknown account");
        return Err(AppError::Unauthorized);
    };

    if !verify_password_async(password, user.password_hash.clone()).await? {
        warn!("Login attempt with wrong password for user {}", user.id);
        return Err(AppError::Unauthorized);
    }

    info!("User {} logged in", user.id);
    Ok(Json(AuthResponse {
        message: "Login successful",
        user: PublicUser::from(&user),
    }))
}
