use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use site_api::config::{Config, ResumeRetention, UploadBackend};
use site_api::db::{create_pool, run_migrations};
use site_api::logging::init_tracing;
use site_api::media::{LocalStorage, MediaStorage, S3Storage};
use site_api::notify::build_transport;
use site_api::routes::{build_router, cors_layer};
use site_api::state::AppState;
use site_api::store::{PgStore, Store};

const UPLOAD_URL_PREFIX: &str = "/uploads";

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing comes first so configuration warnings are not lost.
    dotenvy::dotenv().ok();
    init_tracing("info");
    let config = Config::from_env()?;

    info!("Starting site API v{}", env!("CARGO_PKG_VERSION"));

    // An unreachable database is fatal: main returns the error and the process exits 1.
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    let media: Arc<dyn MediaStorage> = match &config.upload.backend {
        UploadBackend::Local => {
            info!("Uploads stored locally in {}", config.upload.dir.display());
            Arc::new(LocalStorage::new(&config.upload.dir, UPLOAD_URL_PREFIX).await?)
        }
        UploadBackend::S3(s3) => {
            info!("Uploads stored in bucket {}", s3.bucket);
            Arc::new(S3Storage::from_config(s3).await)
        }
    };
    let public_upload_dir = matches!(config.upload.backend, UploadBackend::Local)
        .then(|| config.upload.dir.clone());

    let mailer = config.mail.as_ref().map(build_transport).transpose()?;

    let resume_archive = match config.resume_retention {
        ResumeRetention::Keep => {
            info!("Resumes are kept in {}", config.resume_dir.display());
            Some(Arc::new(
                LocalStorage::new(&config.resume_dir, "resumes").await?,
            ))
        }
        ResumeRetention::Discard => None,
    };

    let state = AppState {
        store: store.clone(),
        media,
        mailer,
        resume_archive,
        max_upload_bytes: config.upload.max_bytes,
        public_upload_dir,
    };

    let app = build_router(state).layer(cors_layer(&config));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on CTRL+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received CTRL+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
