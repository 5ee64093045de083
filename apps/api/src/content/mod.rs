//! Site content: jobs, gallery images, services and per-page content blocks.

pub mod images;
pub mod jobs;
pub mod pages;
pub mod seed;
pub mod services;

use serde::Serialize;
use uuid::Uuid;

/// Body returned by every `DELETE` route.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: String,
    pub id: Uuid,
}

impl Deleted {
    pub fn new(resource: &str, id: Uuid) -> Self {
        Self {
            message: format!("{resource} deleted successfully"),
            id,
        }
    }
}
