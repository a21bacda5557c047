use std::sync::Arc;

use tasklane_db::models::{DEFAULT_PRIORITY, NewTodo, Todo};
use tasklane_db::repositories::{TodoStore, TodoWrite, is_foreign_key_violation};
use tracing::{info, warn};

use super::{parse_id, require_text};
use crate::error::ApiError;
use crate::utils::{IdField, non_empty};

const ENTITY: &str = "Todo";

/// Client-supplied todo fields. `None` means "not sent". The activity id is
/// kept in its wire form so it is only decoded once the earlier checks of an
/// operation have passed.
#[derive(Debug, Clone, Default)]
pub struct TodoFields {
    pub activity_group_id: Option<IdField>,
    pub title: Option<String>,
    pub is_active: Option<bool>,
    pub priority: Option<String>,
}

impl TodoFields {
    /// `Ok(None)` when the id was not sent or sent as `0` / `""`.
    fn activity_id(&self) -> Result<Option<i64>, ApiError> {
        match &self.activity_group_id {
            Some(raw) => raw.resolve().map_err(|_| {
                ApiError::Validation("activity_group_id must be an integer".to_string())
            }),
            None => Ok(None),
        }
    }

    /// Overwrites every field of `todo` that was sent with a non-empty value.
    pub fn apply_to(self, todo: &mut Todo) -> Result<(), ApiError> {
        if let Some(activity_id) = self.activity_id()? {
            todo.activity_group_id = activity_id;
        }
        if let Some(is_active) = self.is_active {
            todo.is_active = is_active;
        }
        if let Some(priority) = non_empty(self.priority) {
            todo.priority = priority;
        }
        if let Some(title) = non_empty(self.title) {
            todo.title = title;
        }
        Ok(())
    }
}

pub struct TodoService {
    todos: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoStore>) -> Self {
        Self { todos }
    }

    /// A blank filter lists everything; a filter that is not an id matches
    /// nothing.
    pub async fn list(&self, activity_filter: Option<&str>) -> Result<Vec<Todo>, ApiError> {
        let filter = activity_filter.map(str::trim).filter(|f| !f.is_empty());
        let todos = match filter {
            None => self.todos.list(None).await?,
            Some(raw) => match raw.parse::<i64>() {
                Ok(activity_id) => self.todos.list(Some(activity_id)).await?,
                Err(_) => Vec::new(),
            },
        };
        Ok(todos)
    }

    pub async fn get(&self, raw_id: &str) -> Result<Todo, ApiError> {
        let id = parse_id(ENTITY, raw_id)?;
        self.todos
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(ENTITY, raw_id))
    }

    /// Validates `title`, then `activity_group_id`. The store rejects the
    /// insert when the activity is missing or deleted.
    pub async fn create(&self, fields: TodoFields) -> Result<Todo, ApiError> {
        let title = require_text("title", fields.title.clone())?;
        let activity_group_id = fields
            .activity_id()?
            .ok_or_else(|| ApiError::missing("activity_group_id"))?;

        let new_todo = NewTodo {
            activity_group_id,
            title,
            is_active: fields.is_active.unwrap_or(true),
            priority: non_empty(fields.priority).unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        };

        let outcome = self
            .todos
            .create(&new_todo)
            .await
            .map_err(map_reference_error)?;
        let todo = saved(outcome, activity_group_id, || {
            ApiError::Internal(anyhow::anyhow!("todo insert returned no row"))
        })?;

        info!("Todo {} created under activity {}", todo.id, activity_group_id);
        Ok(todo)
    }

    /// The todo is looked up before the body is decoded, so an unknown id is
    /// a 404 whatever the body holds.
    pub async fn update(&self, raw_id: &str, fields: TodoFields) -> Result<Todo, ApiError> {
        let mut todo = self.get(raw_id).await?;
        fields.apply_to(&mut todo)?;

        let outcome = self
            .todos
            .update(&todo)
            .await
            .map_err(map_reference_error)?;
        saved(outcome, todo.activity_group_id, || {
            ApiError::not_found(ENTITY, raw_id)
        })
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), ApiError> {
        let id = parse_id(ENTITY, raw_id)?;
        if self.todos.delete(id).await? {
            info!("Todo {} deleted", id);
            Ok(())
        } else {
            Err(ApiError::not_found(ENTITY, raw_id))
        }
    }
}

fn saved(
    outcome: TodoWrite,
    activity_id: i64,
    todo_missing: impl FnOnce() -> ApiError,
) -> Result<Todo, ApiError> {
    match outcome {
        TodoWrite::Saved(todo) => Ok(todo),
        TodoWrite::ActivityMissing => Err(ApiError::Reference(format!(
            "Activity with ID {} Not Found",
            activity_id
        ))),
        TodoWrite::TodoMissing => Err(todo_missing()),
    }
}

fn map_reference_error(err: anyhow::Error) -> ApiError {
    if is_foreign_key_violation(&err) {
        warn!("Todo write rejected by foreign key: {:#}", err);
        ApiError::Reference("activity_group_id not found".to_string())
    } else {
        ApiError::Internal(err)
    }
}
