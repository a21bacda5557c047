use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: i64,
    pub email: Option<String>,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert payload; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub title: String,
    pub email: Option<String>,
}
