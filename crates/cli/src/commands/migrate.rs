//! Database migration command.
//!
//! Applies the SQL migrations embedded from `crates/catalog/migrations/`.

use orchard_catalog::{CatalogConfig, db};

/// Run catalog database migrations.
///
/// # Errors
///
/// Returns an error if configuration is missing, the database is
/// unreachable, or a migration fails to apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env()?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&config.database_url, config.max_connections).await?;

    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../catalog/migrations").run(&pool).await?;

    tracing::info!("Catalog migrations complete");
    Ok(())
}
