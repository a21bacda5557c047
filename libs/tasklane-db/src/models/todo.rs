use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_PRIORITY: &str = "very-high";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub activity_group_id: i64,
    pub title: String,
    pub is_active: bool,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub activity_group_id: i64,
    pub title: String,
    pub is_active: bool,
    pub priority: String,
}
