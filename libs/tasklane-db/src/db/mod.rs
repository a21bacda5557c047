use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Opens a pool against `database_url`. Migrations are not applied here.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://") {
        return Err(anyhow::anyhow!(
            "DATABASE_URL must start with postgres:// or postgresql://"
        ));
    }

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run DB migrations")?;

    info!("Database schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::init_pool;

    #[tokio::test]
    async fn rejects_non_postgres_urls_before_connecting() {
        for url in ["mysql://root@localhost/todo", "sqlite://todo.db", ""] {
            let err = init_pool(url, 1).await.unwrap_err();
            assert!(
                err.to_string().contains("postgres://"),
                "unexpected error for {url:?}: {err}"
            );
        }
    }
}
