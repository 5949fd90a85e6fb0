//! Clubdeck storage layer.
//!
//! Postgres access via sqlx: connection pool construction, migrations,
//! row models, and repositories. Mutations that span a club and its audit
//! snapshot (or a club and its roster) run inside a single transaction with
//! the club row locked, so the decision logic in `clubdeck-core` always
//! reads a consistent prior state.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Errors from a guarded save: either the domain said no, or the database
/// did.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Core(#[from] clubdeck_core::error::CoreError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations from the crate's `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
