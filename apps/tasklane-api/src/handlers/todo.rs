use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasklane_db::models::Todo;

use crate::AppState;
use crate::error::ApiError;
use crate::response::{created, empty, ok};
use crate::services::TodoFields;
use crate::utils::{FlagField, IdField};

#[derive(Debug, Deserialize)]
pub struct TodoFilter {
    pub activity_group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TodoRequest {
    #[serde(default)]
    pub activity_group_id: Option<IdField>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_active: Option<FlagField>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl From<TodoRequest> for TodoFields {
    fn from(req: TodoRequest) -> Self {
        TodoFields {
            activity_group_id: req.activity_group_id,
            title: req.title,
            is_active: req.is_active.and_then(|flag| flag.resolve()),
            priority: req.priority,
        }
    }
}

/// Wire shape of a todo: the activity id is a string, the flag a boolean.
#[derive(Debug, Serialize)]
pub struct TodoView {
    pub id: i64,
    pub activity_group_id: String,
    pub title: String,
    pub is_active: bool,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Todo> for TodoView {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            activity_group_id: todo.activity_group_id.to_string(),
            title: todo.title,
            is_active: todo.is_active,
            priority: todo.priority,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
            deleted_at: todo.deleted_at,
        }
    }
}

/// GET /todo-items?activity_group_id=
pub async fn list_todos(
    State(state): State<AppState>,
    filter: Result<Query<TodoFilter>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(filter) = filter?;
    let todos = state
        .todo_service
        .list(filter.activity_group_id.as_deref())
        .await?;
    let views: Vec<TodoView> = todos.into_iter().map(TodoView::from).collect();
    Ok(ok(views))
}

/// GET /todo-items/{id}
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let todo = state.todo_service.get(&id).await?;
    Ok(ok(TodoView::from(todo)))
}

/// POST /todo-items
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let todo = state.todo_service.create(req.into()).await?;
    Ok(created(TodoView::from(todo)))
}

/// PATCH /todo-items/{id}
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let todo = state.todo_service.update(&id, req.into()).await?;
    Ok(ok(TodoView::from(todo)))
}

/// DELETE /todo-items/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state.todo_service.delete(&id).await?;
    Ok(ok(empty()))
}
