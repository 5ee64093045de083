//! Fills empty job and image sets with sample content.
//! Exits 0 on success or when nothing needed seeding, 1 on failure.

use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};

use site_api::config::require_env;
use site_api::content::seed::seed_samples;
use site_api::db::{create_pool, run_migrations};
use site_api::logging::init_tracing;
use site_api::store::{PgStore, Store};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("info");
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error seeding database: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let database_url = require_env("DATABASE_URL")?;
    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let store = PgStore::new(pool);

    let report = seed_samples(&store).await;
    store.close().await;
    let report = report?;

    if report.is_noop() {
        info!("Database already has content, nothing to seed");
    } else {
        info!(
            "Seeded {} jobs, {} home images, {} career-globe images",
            report.jobs, report.home_images, report.globe_images
        );
    }
    Ok(())
}
