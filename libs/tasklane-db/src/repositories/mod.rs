//! Store traits and their PostgreSQL implementations.
//!
//! Handlers only see the traits so the HTTP layer can run against any
//! backing store. Every read excludes soft-deleted rows.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Activity, NewActivity, NewTodo, Todo};

pub mod activity_repo;
pub mod todo_repo;

pub use activity_repo::ActivityRepository;
pub use todo_repo::TodoRepository;

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Activity>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Activity>>;

    async fn create(&self, activity: &NewActivity) -> Result<Activity>;

    /// Persists `title` and `email` of an existing row. Returns `None` when
    /// the row vanished between lookup and write.
    async fn update(&self, activity: &Activity) -> Result<Option<Activity>>;

    /// Soft-deletes the activity and all of its todos atomically.
    /// Returns the number of cascaded todos, or `None` if no live activity
    /// had this id.
    async fn delete_cascade(&self, id: i64) -> Result<Option<u64>>;
}

/// Result of a todo write that checks its parent activity in the same
/// transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TodoWrite {
    Saved(Todo),
    /// The referenced activity is absent or soft-deleted.
    ActivityMissing,
    /// The todo itself is absent or soft-deleted.
    TodoMissing,
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn list(&self, activity_group_id: Option<i64>) -> Result<Vec<Todo>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>>;

    /// Inserts only while the parent activity is live; the parent row is
    /// share-locked until commit so a concurrent cascade waits for it.
    async fn create(&self, todo: &NewTodo) -> Result<TodoWrite>;

    /// Same parent guarantee as `create`, for the activity the todo points
    /// at after the update.
    async fn update(&self, todo: &Todo) -> Result<TodoWrite>;

    /// Returns `false` if no live todo had this id.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// True when `err` carries a foreign-key violation reported by the database.
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db| db.is_foreign_key_violation())
    })
}
