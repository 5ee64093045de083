use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    Image, ImageCategory, ImagePatch, Job, JobPatch, NewImage, NewJob, NewService, NewUser,
    PageContent, PageUpdate, Service, ServicePatch, User,
};

const JOB_COLUMNS: &str = "id, title, location, description, created_at, updated_at";
const IMAGE_COLUMNS: &str = "id, category, src, alt, created_at, updated_at";
const SERVICE_COLUMNS: &str = "id, title, description, created_at, updated_at";
const PAGE_COLUMNS: &str = "id, page_id, content, last_updated_by, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";

/// Postgres-backed store. Owns the pool; `close` drains it at shutdown.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ImageRow {
    id: Uuid,
    category: String,
    src: String,
    alt: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ImageRow> for Image {
    type Error = StoreError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        let category: ImageCategory = row
            .category
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("image {} has category {}", row.id, row.category)))?;
        Ok(Image {
            id: row.id,
            category,
            src: row.src,
            alt: row.alt,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PageRow {
    id: Uuid,
    page_id: String,
    content: Value,
    last_updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PageRow> for PageContent {
    type Error = StoreError;

    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        let Value::Object(content) = row.content else {
            return Err(StoreError::Corrupt(format!(
                "page {} content is not an object",
                row.page_id
            )));
        };
        Ok(PageContent {
            id: row.id,
            page_id: row.page_id,
            content,
            last_updated_by: row.last_updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn unique_violation(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(message.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        Ok(sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_job(&self, job: NewJob) -> StoreResult<Job> {
        let row = sqlx::query_as::<_, Job>(&format!(
            "INSERT INTO jobs (id, title, location, description) VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.location)
        .bind(&job.description)
        .fetch_one(&self.pool)
        .await?;
        debug!("Inserted job {}", row.id);
        Ok(row)
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> StoreResult<Option<Job>> {
        Ok(sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET title = COALESCE($2, title),
                location = COALESCE($3, location),
                description = COALESCE($4, description),
                updated_at = now()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.location)
        .bind(patch.description)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        Ok(sqlx::query_as::<_, Job>(&format!(
            "DELETE FROM jobs WHERE id = $1 RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_images(&self, category: Option<ImageCategory>) -> StoreResult<Vec<Image>> {
        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images \
             WHERE ($1::text IS NULL OR category = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(category.map(|c| c.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Image::try_from).collect()
    }

    async fn insert_image(&self, image: NewImage) -> StoreResult<Image> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "INSERT INTO images (id, category, src, alt) VALUES ($1, $2, $3, $4) \
             RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(image.category.as_str())
        .bind(&image.src)
        .bind(&image.alt)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn update_image(&self, id: Uuid, patch: ImagePatch) -> StoreResult<Option<Image>> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            r#"
            UPDATE images
            SET category = COALESCE($2, category),
                src = COALESCE($3, src),
                alt = COALESCE($4, alt),
                updated_at = now()
            WHERE id = $1
            RETURNING {IMAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.src)
        .bind(patch.alt)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Image::try_from).transpose()
    }

    async fn delete_image(&self, id: Uuid) -> StoreResult<Option<Image>> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "DELETE FROM images WHERE id = $1 RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Image::try_from).transpose()
    }

    async fn list_services(&self) -> StoreResult<Vec<Service>> {
        Ok(sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_service(&self, service: NewService) -> StoreResult<Service> {
        Ok(sqlx::query_as::<_, Service>(&format!(
            "INSERT INTO services (id, title, description) VALUES ($1, $2, $3) \
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&service.title)
        .bind(&service.description)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_service(
        &self,
        id: Uuid,
        patch: ServicePatch,
    ) -> StoreResult<Option<Service>> {
        Ok(sqlx::query_as::<_, Service>(&format!(
            r#"
            UPDATE services
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = now()
            WHERE id = $1
            RETURNING {SERVICE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_service(&self, id: Uuid) -> StoreResult<Option<Service>> {
        Ok(sqlx::query_as::<_, Service>(&format!(
            "DELETE FROM services WHERE id = $1 RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_page(&self, page_id: &str) -> StoreResult<Option<PageContent>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM page_contents WHERE page_id = $1"
        ))
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(PageContent::try_from).transpose()
    }

    async fn upsert_page(&self, page_id: &str, update: PageUpdate) -> StoreResult<PageContent> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            r#"
            INSERT INTO page_contents (id, page_id, content, last_updated_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (page_id) DO UPDATE
            SET content = EXCLUDED.content,
                last_updated_by = COALESCE(EXCLUDED.last_updated_by, page_contents.last_updated_by),
                updated_at = now()
            RETURNING {PAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(page_id)
        .bind(Json(&update.content))
        .bind(update.last_updated_by)
        .fetch_one(&self.pool)
        .await?;
        debug!("Upserted page content for {page_id}");
        row.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user.email())
        .bind(user.password_hash())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "User with this email already exists"))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}
