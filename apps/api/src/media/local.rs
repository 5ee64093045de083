use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::{generate_filename, MediaError, MediaStorage, StoredMedia, UploadedFile};

/// Writes uploads to a directory and hands back URLs under `url_prefix`.
pub struct LocalStorage {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalStorage {
    /// Creates the directory if it does not exist yet.
    pub async fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Result<Self, MediaError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Maps a stored `src` back to a file name in this directory. Anything
    /// outside the prefix, or trying to escape the directory, is not ours.
    fn owned_name<'a>(&self, src: &'a str) -> Option<&'a str> {
        let name = src.strip_prefix(&self.url_prefix)?.strip_prefix('/')?;
        let safe = !name.is_empty()
            && !name.contains('/')
            && !name.contains('\\')
            && name != ".."
            && name != ".";
        safe.then_some(name)
    }
}

#[async_trait]
impl MediaStorage for LocalStorage {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn store(&self, file: &UploadedFile) -> Result<StoredMedia, MediaError> {
        let name = generate_filename(file.file_name.as_deref());
        let path = self.dir.join(&name);
        fs::write(&path, &file.bytes).await?;
        info!("Stored upload {} ({} bytes)", path.display(), file.bytes.len());
        Ok(StoredMedia {
            url: format!("{}/{}", self.url_prefix, name),
            id: name,
        })
    }

    async fn release(&self, src: &str) -> Result<bool, MediaError> {
        let Some(name) = self.owned_name(src) else {
            debug!("Not a local upload, nothing to remove: {src}");
            return Ok(false);
        };
        match fs::remove_file(self.dir.join(name)).await {
            Ok(()) => {
                info!("Removed local upload {name}");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
