use std::path::PathBuf;
use std::sync::Arc;

use crate::media::{LocalStorage, MediaStorage};
use crate::notify::MailTransport;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub media: Arc<dyn MediaStorage>,
    /// `None` when no email provider is configured; notification routes answer 503.
    pub mailer: Option<Arc<dyn MailTransport>>,
    /// Set only when résumés are kept after sending.
    pub resume_archive: Option<Arc<LocalStorage>>,
    pub max_upload_bytes: usize,
    /// Directory served under `/uploads`. `None` for remote media backends.
    pub public_upload_dir: Option<PathBuf>,
}
