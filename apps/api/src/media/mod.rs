//! File uploads. One `MediaStorage` capability with swappable backends:
//! local disk (served under `/uploads`) or an S3-compatible media host.

pub mod handlers;
pub mod local;
pub mod multipart;
pub mod s3;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use thiserror::Error;

pub use local::LocalStorage;
pub use multipart::{read_single_file, SingleFileForm};
pub use s3::S3Storage;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("No file uploaded: expected a '{0}' field")]
    MissingFile(&'static str),

    #[error("File exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },

    #[error("Unsupported file type '{0}': only images are accepted")]
    UnsupportedType(String),

    #[error("Malformed upload: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote media host error: {0}")]
    Remote(String),
}

/// A fully buffered file part from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
    }

    /// Only `image/*` parts are accepted by the public upload route.
    pub fn require_image(&self) -> Result<(), MediaError> {
        if self.is_image() {
            return Ok(());
        }
        Err(MediaError::UnsupportedType(
            self.content_type
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        ))
    }
}

/// Where a file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub url: String,
    /// Backend-assigned name: the local filename or the remote object key.
    pub id: String,
}

#[async_trait]
pub trait MediaStorage: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn store(&self, file: &UploadedFile) -> Result<StoredMedia, MediaError>;

    /// Removes the object behind `src` if this backend owns it.
    /// Returns whether anything was deleted.
    async fn release(&self, src: &str) -> Result<bool, MediaError>;
}

/// `<unix-millis>-<random 9 digits><.ext>`, keeping a sanitised original extension.
pub fn generate_filename(original: Option<&str>) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{millis}-{suffix}{ext}")
}
