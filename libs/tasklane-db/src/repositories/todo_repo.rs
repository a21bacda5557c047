use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{TodoStore, TodoWrite};
use crate::models::{NewTodo, Todo};

const TODO_COLUMNS: &str =
    "id, activity_group_id, title, is_active, priority, created_at, updated_at, deleted_at";

#[derive(Debug, Clone)]
pub struct TodoRepository {
    pool: PgPool,
}

impl TodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for TodoRepository {
    async fn list(&self, activity_group_id: Option<i64>) -> Result<Vec<Todo>> {
        match activity_group_id {
            Some(activity_id) => sqlx::query_as::<_, Todo>(&format!(
                "SELECT {TODO_COLUMNS} FROM todos WHERE activity_group_id = $1 AND deleted_at IS NULL ORDER BY id ASC"
            ))
            .bind(activity_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch todos by activity"),
            None => sqlx::query_as::<_, Todo>(&format!(
                "SELECT {TODO_COLUMNS} FROM todos WHERE deleted_at IS NULL ORDER BY id ASC"
            ))
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch todos"),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch todo by ID")
    }

    async fn create(&self, todo: &NewTodo) -> Result<TodoWrite> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start todo insert")?;

        if !lock_live_activity(&mut tx, todo.activity_group_id).await? {
            return Ok(TodoWrite::ActivityMissing);
        }

        let rec = sqlx::query_as::<_, Todo>(&format!(
            r#"
            INSERT INTO todos (activity_group_id, title, is_active, priority)
            VALUES ($1, $2, $3, $4)
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(todo.activity_group_id)
        .bind(&todo.title)
        .bind(todo.is_active)
        .bind(&todo.priority)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to create todo")?;

        tx.commit().await.context("Failed to commit todo insert")?;
        Ok(TodoWrite::Saved(rec))
    }

    async fn update(&self, todo: &Todo) -> Result<TodoWrite> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start todo update")?;

        // Parent first: the cascade delete locks the activity before its todos.
        if !lock_live_activity(&mut tx, todo.activity_group_id).await? {
            return Ok(TodoWrite::ActivityMissing);
        }

        let rec = sqlx::query_as::<_, Todo>(&format!(
            r#"
            UPDATE todos
            SET activity_group_id = $1, title = $2, is_active = $3, priority = $4,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $5 AND deleted_at IS NULL
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(todo.activity_group_id)
        .bind(&todo.title)
        .bind(todo.is_active)
        .bind(&todo.priority)
        .bind(todo.id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to update todo")?;

        let Some(rec) = rec else {
            return Ok(TodoWrite::TodoMissing);
        };

        tx.commit().await.context("Failed to commit todo update")?;
        Ok(TodoWrite::Saved(rec))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let res = sqlx::query(
            "UPDATE todos SET deleted_at = CURRENT_TIMESTAMP WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to delete todo")?;

        Ok(res.rows_affected() > 0)
    }
}

/// Share-locks the activity row if it is live. Returns `false` otherwise.
async fn lock_live_activity(tx: &mut Transaction<'_, Postgres>, activity_id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM activities WHERE id = $1 AND deleted_at IS NULL FOR SHARE",
    )
    .bind(activity_id)
    .fetch_optional(&mut **tx)
    .await
    .context("Failed to lock parent activity")?;

    Ok(found.is_some())
}
