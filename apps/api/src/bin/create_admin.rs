//! Creates the admin account from `ADMIN_EMAIL` / `ADMIN_PASSWORD`.
//! Exits 0 when the account was created or already exists, 1 on failure.

use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};

use site_api::auth::admin::{ensure_admin, AdminOutcome};
use site_api::config::{require_env, AdminCredentials};
use site_api::db::{create_pool, run_migrations};
use site_api::logging::init_tracing;
use site_api::store::{PgStore, Store};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("info");
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error creating admin user: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let database_url = require_env("DATABASE_URL")?;
    let creds = AdminCredentials::from_env();

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let store = PgStore::new(pool);

    let outcome = ensure_admin(&store, &creds).await;
    store.close().await;

    match outcome? {
        AdminOutcome::Created(user) => info!("Admin user created: {} ({})", user.email, user.id),
        AdminOutcome::AlreadyExists(user) => {
            info!("Admin user already exists: {}", user.email)
        }
    }
    Ok(())
}
