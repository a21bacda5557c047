#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use serde_json::Value;
use tasklane_api::{AppState, app};
use tasklane_db::models::{Activity, NewActivity, NewTodo, Todo};
use tasklane_db::repositories::{ActivityStore, TodoStore, TodoWrite};
use tower::ServiceExt;

#[derive(Default)]
struct Tables {
    activities: Vec<Activity>,
    todos: Vec<Todo>,
    next_activity_id: i64,
    next_todo_id: i64,
    delete_on_next_todo_write: Option<i64>,
}

impl Tables {
    fn soft_delete_activity(&mut self, id: i64) -> Option<u64> {
        let now = Utc::now();
        let row = self
            .activities
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())?;
        row.deleted_at = Some(now);

        let mut cascaded = 0;
        for todo in self
            .todos
            .iter_mut()
            .filter(|t| t.activity_group_id == id && t.deleted_at.is_none())
        {
            todo.deleted_at = Some(now);
            cascaded += 1;
        }
        Some(cascaded)
    }

    /// Runs a pending concurrent delete, then reports whether the parent is
    /// still live. Both happen under one lock, like the row lock the
    /// repository takes.
    fn lock_live_activity(&mut self, id: i64) -> bool {
        if let Some(victim) = self.delete_on_next_todo_write.take() {
            self.soft_delete_activity(victim);
        }
        self.activities
            .iter()
            .any(|a| a.id == id && a.deleted_at.is_none())
    }
}

/// In-memory stand-in for the PostgreSQL repositories with the same
/// soft-delete and foreign-key behaviour.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    reject_todo_writes: Arc<AtomicBool>,
}

struct MemoryActivities(MemoryStore);
struct MemoryTodos(MemoryStore);

impl MemoryStore {
    pub fn state(&self) -> AppState {
        AppState::new(
            Arc::new(MemoryActivities(self.clone())),
            Arc::new(MemoryTodos(self.clone())),
        )
    }

    pub fn router(&self) -> Router {
        app(self.state())
    }

    /// Makes the next todo writes fail the way a foreign-key violation does.
    pub fn reject_todo_writes(&self) {
        self.reject_todo_writes.store(true, Ordering::SeqCst);
    }

    /// Deletes activity `id` (with its todos) after the service has done its
    /// checks but before the next todo write reaches the table.
    pub fn delete_activity_during_next_todo_write(&self, id: i64) {
        self.tables.lock().unwrap().delete_on_next_todo_write = Some(id);
    }

    pub fn activity_rows(&self) -> usize {
        self.tables.lock().unwrap().activities.len()
    }

    pub fn raw_todo(&self, id: i64) -> Option<Todo> {
        self.tables
            .lock()
            .unwrap()
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }
}

#[async_trait]
impl ActivityStore for MemoryActivities {
    async fn list(&self) -> Result<Vec<Activity>> {
        let tables = self.0.tables.lock().unwrap();
        Ok(tables
            .activities
            .iter()
            .filter(|a| a.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Activity>> {
        let tables = self.0.tables.lock().unwrap();
        Ok(tables
            .activities
            .iter()
            .find(|a| a.id == id && a.deleted_at.is_none())
            .cloned())
    }

    async fn create(&self, activity: &NewActivity) -> Result<Activity> {
        let mut tables = self.0.tables.lock().unwrap();
        tables.next_activity_id += 1;
        let now = Utc::now();
        let row = Activity {
            id: tables.next_activity_id,
            email: activity.email.clone(),
            title: activity.title.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.activities.push(row.clone());
        Ok(row)
    }

    async fn update(&self, activity: &Activity) -> Result<Option<Activity>> {
        let mut tables = self.0.tables.lock().unwrap();
        let Some(row) = tables
            .activities
            .iter_mut()
            .find(|a| a.id == activity.id && a.deleted_at.is_none())
        else {
            return Ok(None);
        };
        row.title = activity.title.clone();
        row.email = activity.email.clone();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_cascade(&self, id: i64) -> Result<Option<u64>> {
        Ok(self.0.tables.lock().unwrap().soft_delete_activity(id))
    }
}

#[async_trait]
impl TodoStore for MemoryTodos {
    async fn list(&self, activity_group_id: Option<i64>) -> Result<Vec<Todo>> {
        let tables = self.0.tables.lock().unwrap();
        Ok(tables
            .todos
            .iter()
            .filter(|t| t.deleted_at.is_none())
            .filter(|t| activity_group_id.is_none_or(|id| t.activity_group_id == id))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Todo>> {
        let tables = self.0.tables.lock().unwrap();
        Ok(tables
            .todos
            .iter()
            .find(|t| t.id == id && t.deleted_at.is_none())
            .cloned())
    }

    async fn create(&self, todo: &NewTodo) -> Result<TodoWrite> {
        if self.0.reject_todo_writes.load(Ordering::SeqCst) {
            return Err(anyhow::Error::new(sqlx::Error::Database(Box::new(
                ForeignKeyViolation,
            )))
            .context("Failed to create todo"));
        }
        let mut tables = self.0.tables.lock().unwrap();
        if !tables.lock_live_activity(todo.activity_group_id) {
            return Ok(TodoWrite::ActivityMissing);
        }
        tables.next_todo_id += 1;
        let now = Utc::now();
        let row = Todo {
            id: tables.next_todo_id,
            activity_group_id: todo.activity_group_id,
            title: todo.title.clone(),
            is_active: todo.is_active,
            priority: todo.priority.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.todos.push(row.clone());
        Ok(TodoWrite::Saved(row))
    }

    async fn update(&self, todo: &Todo) -> Result<TodoWrite> {
        let mut tables = self.0.tables.lock().unwrap();
        if !tables.lock_live_activity(todo.activity_group_id) {
            return Ok(TodoWrite::ActivityMissing);
        }
        let Some(row) = tables
            .todos
            .iter_mut()
            .find(|t| t.id == todo.id && t.deleted_at.is_none())
        else {
            return Ok(TodoWrite::TodoMissing);
        };
        row.activity_group_id = todo.activity_group_id;
        row.title = todo.title.clone();
        row.is_active = todo.is_active;
        row.priority = todo.priority.clone();
        row.updated_at = Utc::now();
        Ok(TodoWrite::Saved(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.0.tables.lock().unwrap();
        match tables
            .todos
            .iter_mut()
            .find(|t| t.id == id && t.deleted_at.is_none())
        {
            Some(row) => {
                row.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug)]
struct ForeignKeyViolation;

impl std::fmt::Display for ForeignKeyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("insert or update on table \"todos\" violates foreign key constraint")
    }
}

impl std::error::Error for ForeignKeyViolation {}

impl sqlx::error::DatabaseError for ForeignKeyViolation {
    fn message(&self) -> &str {
        "insert or update on table \"todos\" violates foreign key constraint"
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> sqlx::error::ErrorKind {
        sqlx::error::ErrorKind::ForeignKeyViolation
    }
}

/// Sends one request through the router and decodes the JSON body.
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn create_activity(router: &Router, title: &str) -> i64 {
    let (status, body) = send(
        router,
        Method::POST,
        "/activity-groups",
        Some(serde_json::json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

pub async fn create_todo(router: &Router, activity_id: i64, title: &str) -> i64 {
    let (status, body) = send(
        router,
        Method::POST,
        "/todo-items",
        Some(serde_json::json!({ "title": title, "activity_group_id": activity_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}
