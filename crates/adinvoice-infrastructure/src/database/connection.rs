//! Control database connection pool

use std::time::Duration;

use adinvoice_shared::config::DatabaseSettings;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

static CONTROL_MIGRATOR: Migrator = sqlx::migrate!("./migrations/control");

pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_seconds))
        .connect(&settings.url)
        .await
}

pub async fn run_control_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    CONTROL_MIGRATOR.run(pool).await?;
    info!("Control database migrations applied");
    Ok(())
}
