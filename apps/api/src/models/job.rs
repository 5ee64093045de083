use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::validation::{optional_non_blank, Required};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for both create and update; presence rules differ per operation.
#[derive(Debug, Default, Deserialize)]
pub struct JobInput {
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl JobInput {
    pub fn into_new(self) -> Result<NewJob, AppError> {
        let mut req = Required::new();
        let title = req.take("title", self.title);
        let location = req.take("location", self.location);
        let description = req.take("description", self.description);
        req.finish()?;
        Ok(NewJob {
            title,
            location,
            description,
        })
    }

    pub fn into_patch(self) -> Result<JobPatch, AppError> {
        Ok(JobPatch {
            title: optional_non_blank("title", self.title)?,
            location: optional_non_blank("location", self.location)?,
            description: optional_non_blank("description", self.description)?,
        })
    }
}

impl JobPatch {
    pub fn apply(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(location) = self.location {
            job.location = location;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
    }
}
