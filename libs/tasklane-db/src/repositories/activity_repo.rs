use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::ActivityStore;
use crate::models::{Activity, NewActivity};

const ACTIVITY_COLUMNS: &str = "id, email, title, created_at, updated_at, deleted_at";

#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for ActivityRepository {
    async fn list(&self) -> Result<Vec<Activity>> {
        sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE deleted_at IS NULL ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch activities")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Activity>> {
        sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch activity by ID")
    }

    async fn create(&self, activity: &NewActivity) -> Result<Activity> {
        let rec = sqlx::query_as::<_, Activity>(&format!(
            "INSERT INTO activities (title, email) VALUES ($1, $2) RETURNING {ACTIVITY_COLUMNS}"
        ))
        .bind(&activity.title)
        .bind(&activity.email)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create activity")?;

        Ok(rec)
    }

    async fn update(&self, activity: &Activity) -> Result<Option<Activity>> {
        sqlx::query_as::<_, Activity>(&format!(
            r#"
            UPDATE activities
            SET title = $1, email = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3 AND deleted_at IS NULL
            RETURNING {ACTIVITY_COLUMNS}
            "#
        ))
        .bind(&activity.title)
        .bind(&activity.email)
        .bind(activity.id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update activity")
    }

    async fn delete_cascade(&self, id: i64) -> Result<Option<u64>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start activity delete")?;

        let deleted = sqlx::query(
            "UPDATE activities SET deleted_at = CURRENT_TIMESTAMP WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete activity")?;

        if deleted.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Ok(None);
        }

        let cascaded = sqlx::query(
            "UPDATE todos SET deleted_at = CURRENT_TIMESTAMP WHERE activity_group_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete todos of activity")?;

        tx.commit().await.context("Failed to commit activity delete")?;

        debug!(
            "Activity {} deleted with {} todos",
            id,
            cascaded.rows_affected()
        );
        Ok(Some(cascaded.rows_affected()))
    }
}
