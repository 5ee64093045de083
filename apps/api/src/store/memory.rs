use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    Image, ImageCategory, ImagePatch, Job, JobPatch, NewImage, NewJob, NewService, NewUser,
    PageContent, PageUpdate, Service, ServicePatch, User,
};

/// In-process store. Records are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
    closed: AtomicBool,
}

#[derive(Default)]
struct Tables {
    jobs: Vec<Job>,
    images: Vec<Image>,
    services: Vec<Service>,
    pages: Vec<PageContent>,
    users: Vec<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self, email: &str) -> usize {
        let tables = self.inner.read().await;
        tables.users.iter().filter(|u| u.email == email).count()
    }
}

/// Newest first; records created in the same instant keep reverse insertion order.
fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    out
}

fn remove_by_id<T>(items: &mut Vec<T>, id: Uuid, id_of: impl Fn(&T) -> Uuid) -> Option<T> {
    let pos = items.iter().position(|item| id_of(item) == id)?;
    Some(items.remove(pos))
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        let tables = self.inner.read().await;
        Ok(newest_first(&tables.jobs, |j| j.created_at))
    }

    async fn insert_job(&self, job: NewJob) -> StoreResult<Job> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            title: job.title,
            location: job.location,
            description: job.description,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> StoreResult<Option<Job>> {
        let mut tables = self.inner.write().await;
        Ok(tables.jobs.iter_mut().find(|j| j.id == id).map(|job| {
            patch.apply(job);
            job.updated_at = Utc::now();
            job.clone()
        }))
    }

    async fn delete_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        let mut tables = self.inner.write().await;
        Ok(remove_by_id(&mut tables.jobs, id, |j| j.id))
    }

    async fn list_images(&self, category: Option<ImageCategory>) -> StoreResult<Vec<Image>> {
        let tables = self.inner.read().await;
        let mut images = newest_first(&tables.images, |i| i.created_at);
        if let Some(category) = category {
            images.retain(|i| i.category == category);
        }
        Ok(images)
    }

    async fn insert_image(&self, image: NewImage) -> StoreResult<Image> {
        let now = Utc::now();
        let image = Image {
            id: Uuid::new_v4(),
            category: image.category,
            src: image.src,
            alt: image.alt,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.images.push(image.clone());
        Ok(image)
    }

    async fn update_image(&self, id: Uuid, patch: ImagePatch) -> StoreResult<Option<Image>> {
        let mut tables = self.inner.write().await;
        Ok(tables.images.iter_mut().find(|i| i.id == id).map(|image| {
            patch.apply(image);
            image.updated_at = Utc::now();
            image.clone()
        }))
    }

    async fn delete_image(&self, id: Uuid) -> StoreResult<Option<Image>> {
        let mut tables = self.inner.write().await;
        Ok(remove_by_id(&mut tables.images, id, |i| i.id))
    }

    async fn list_services(&self) -> StoreResult<Vec<Service>> {
        let tables = self.inner.read().await;
        Ok(newest_first(&tables.services, |s| s.created_at))
    }

    async fn insert_service(&self, service: NewService) -> StoreResult<Service> {
        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            title: service.title,
            description: service.description,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.services.push(service.clone());
        Ok(service)
    }

    async fn update_service(
        &self,
        id: Uuid,
        patch: ServicePatch,
    ) -> StoreResult<Option<Service>> {
        let mut tables = self.inner.write().await;
        Ok(tables.services.iter_mut().find(|s| s.id == id).map(|service| {
            patch.apply(service);
            service.updated_at = Utc::now();
            service.clone()
        }))
    }

    async fn delete_service(&self, id: Uuid) -> StoreResult<Option<Service>> {
        let mut tables = self.inner.write().await;
        Ok(remove_by_id(&mut tables.services, id, |s| s.id))
    }

    async fn get_page(&self, page_id: &str) -> StoreResult<Option<PageContent>> {
        let tables = self.inner.read().await;
        Ok(tables.pages.iter().find(|p| p.page_id == page_id).cloned())
    }

    async fn upsert_page(&self, page_id: &str, update: PageUpdate) -> StoreResult<PageContent> {
        let mut tables = self.inner.write().await;
        let now = Utc::now();
        if let Some(page) = tables.pages.iter_mut().find(|p| p.page_id == page_id) {
            page.content = update.content;
            if update.last_updated_by.is_some() {
                page.last_updated_by = update.last_updated_by;
            }
            page.updated_at = now;
            return Ok(page.clone());
        }
        let page = PageContent {
            id: Uuid::new_v4(),
            page_id: page_id.to_string(),
            content: update.content,
            last_updated_by: update.last_updated_by,
            created_at: now,
            updated_at: now,
        };
        tables.pages.push(page.clone());
        Ok(page)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.inner.write().await;
        if tables.users.iter().any(|u| u.email == user.email()) {
            return Err(StoreError::Duplicate(
                "User with this email already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email().to_string(),
            password_hash: user.password_hash().to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
