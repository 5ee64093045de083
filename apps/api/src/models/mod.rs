pub mod image;
pub mod job;
pub mod page;
pub mod service;
pub mod user;

pub use image::{Image, ImageCategory, ImageInput, ImagePatch, NewImage};
pub use job::{Job, JobInput, JobPatch, NewJob};
pub use page::{PageContent, PageInput, PageUpdate};
pub use service::{NewService, Service, ServiceInput, ServicePatch};
pub use user::{NewUser, PublicUser, User};
