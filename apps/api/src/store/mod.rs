//! Persistence seam. Handlers only ever see `Arc<dyn Store>`.
//!
//! `PgStore` is the production backend; `MemoryStore` has the same ordering,
//! uniqueness and upsert semantics and backs the test-suite.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Image, ImageCategory, ImagePatch, Job, JobPatch, NewImage, NewJob, NewService, NewUser,
    PageContent, PageUpdate, Service, ServicePatch, User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key (email, pageId) already exists. First writer wins.
    #[error("{0}")]
    Duplicate(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store is closed")]
    Closed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Every list is ordered by creation time, newest first.
/// `update_*` and `delete_*` return `None` when no record has that id.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_jobs(&self) -> StoreResult<Vec<Job>>;
    async fn insert_job(&self, job: NewJob) -> StoreResult<Job>;
    async fn update_job(&self, id: Uuid, patch: JobPatch) -> StoreResult<Option<Job>>;
    async fn delete_job(&self, id: Uuid) -> StoreResult<Option<Job>>;

    async fn list_images(&self, category: Option<ImageCategory>) -> StoreResult<Vec<Image>>;
    async fn insert_image(&self, image: NewImage) -> StoreResult<Image>;
    async fn update_image(&self, id: Uuid, patch: ImagePatch) -> StoreResult<Option<Image>>;
    async fn delete_image(&self, id: Uuid) -> StoreResult<Option<Image>>;

    async fn list_services(&self) -> StoreResult<Vec<Service>>;
    async fn insert_service(&self, service: NewService) -> StoreResult<Service>;
    async fn update_service(&self, id: Uuid, patch: ServicePatch)
        -> StoreResult<Option<Service>>;
    async fn delete_service(&self, id: Uuid) -> StoreResult<Option<Service>>;

    async fn get_page(&self, page_id: &str) -> StoreResult<Option<PageContent>>;
    /// Insert-if-absent, else replace the content map wholesale.
    async fn upsert_page(&self, page_id: &str, update: PageUpdate) -> StoreResult<PageContent>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Fails with `Duplicate` when the email is already registered.
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> StoreResult<()>;

    /// Releases the underlying connection(s). Called once at shutdown.
    async fn close(&self);
}
