//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use sqlx::PgPool;

/// Connect to the storefront database named by `STOREFRONT_DATABASE_URL`
/// (or `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let database_url =
        pickles_storefront::config::get_database_url("STOREFRONT_DATABASE_URL")?;
    tracing::info!("Connecting to storefront database...");
    Ok(pickles_storefront::db::create_pool(&database_url).await?)
}
