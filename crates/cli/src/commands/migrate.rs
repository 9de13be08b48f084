//! Database migration command.
//!
//! Applies `crates/api/migrations/` to the catalog database. Migrations are
//! embedded at compile time, so the binary can run anywhere.

use product_catalog_api::db;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: CATALOG_DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending catalog migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a migration cannot be applied.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url().ok_or(MigrationError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&database_url, 2).await?;

    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
