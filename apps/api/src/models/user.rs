use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::password::hash_new_password;
use crate::errors::AppError;
use crate::validation::is_valid_email;

/// Stored account. Not `Serialize`: the hash must never reach a response.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The only user shape that is ever serialized.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// A user ready to be written. Only constructible through [`NewUser::from_plaintext`],
/// so every insert goes through email normalisation and password hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    email: String,
    password_hash: String,
}

impl NewUser {
    pub async fn from_plaintext(email: &str, password: String) -> Result<Self, AppError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AppError::validation("Please enter a valid email"));
        }
        let password_hash = hash_new_password(password).await?;
        Ok(NewUser {
            email,
            password_hash,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[tokio::test]
    async fn test_from_plaintext_lowercases_and_hashes() {
        let user = NewUser::from_plaintext("  Admin@Example.COM ", "password".into())
            .await
            .unwrap();
        assert_eq!(user.email(), "admin@example.com");
        assert_ne!(user.password_hash(), "password");
        assert!(verify_password("password", user.password_hash()));
    }

    #[tokio::test]
    async fn test_from_plaintext_rejects_bad_email() {
        let err = NewUser::from_plaintext("not-an-email", "password".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_from_plaintext_rejects_short_password() {
        let err = NewUser::from_plaintext("a@b.co", "12345".into()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("at least 6")));
    }
}
