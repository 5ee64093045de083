use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::validation::{optional_non_blank, Required};

/// A service offering shown on the marketing site.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ServiceInput {
    pub fn into_new(self) -> Result<NewService, AppError> {
        let mut req = Required::new();
        let title = req.take("title", self.title);
        let description = req.take("description", self.description);
        req.finish()?;
        Ok(NewService { title, description })
    }

    pub fn into_patch(self) -> Result<ServicePatch, AppError> {
        Ok(ServicePatch {
            title: optional_non_blank("title", self.title)?,
            description: optional_non_blank("description", self.description)?,
        })
    }
}

impl ServicePatch {
    pub fn apply(self, service: &mut Service) {
        if let Some(title) = self.title {
            service.title = title;
        }
        if let Some(description) = self.description {
            service.description = description;
        }
    }
}
