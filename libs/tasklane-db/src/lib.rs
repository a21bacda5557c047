pub mod db;
pub mod models;
pub mod repositories;

pub use sqlx;
use anyhow::Result;

/// Connects and brings the schema up to date.
pub async fn connect(url: &str, max_connections: u32) -> Result<sqlx::PgPool> {
    let pool = db::init_pool(url, max_connections).await?;
    db::run_migrations(&pool).await?;
    Ok(pool)
}
