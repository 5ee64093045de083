use tracing::info;

use crate::config::AdminCredentials;
use crate::errors::AppError;
use crate::models::user::normalize_email;
use crate::models::{NewUser, PublicUser};
use crate::store::Store;

#[derive(Debug)]
pub enum AdminOutcome {
    Created(PublicUser),
    AlreadyExists(PublicUser),
}

/// Creates the admin account unless one with that email exists already.
pub async fn ensure_admin(
    store: &dyn Store,
    creds: &AdminCredentials,
) -> Result<AdminOutcome, AppError> {
    if let Some(existing) = store
        .find_user_by_email(&normalize_email(&creds.email))
        .await?
    {
        info!("Admin user {} already exists", existing.email);
        return Ok(AdminOutcome::AlreadyExists(PublicUser::from(&existing)));
    }

    let user = store
        .insert_user(NewUser::from_plaintext(&creds.email, creds.password.clone()).await?)
        .await?;
    info!("Admin user {} created", user.email);
    Ok(AdminOutcome::Created(PublicUser::from(&user)))
}
