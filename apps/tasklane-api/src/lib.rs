pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{Router, routing::get};
use tasklane_db::repositories::{ActivityRepository, ActivityStore, TodoRepository, TodoStore};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use handlers::{activity, health, todo};
use services::{ActivityService, TodoService};

#[derive(Clone)]
pub struct AppState {
    pub activity_service: Arc<ActivityService>,
    pub todo_service: Arc<TodoService>,
}

impl AppState {
    pub fn new(activities: Arc<dyn ActivityStore>, todos: Arc<dyn TodoStore>) -> Self {
        Self {
            activity_service: Arc::new(ActivityService::new(activities)),
            todo_service: Arc::new(TodoService::new(todos)),
        }
    }

    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self::new(
            Arc::new(ActivityRepository::new(pool.clone())),
            Arc::new(TodoRepository::new(pool)),
        )
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        .route(
            "/activity-groups",
            get(activity::list_activities).post(activity::create_activity),
        )
        .route(
            "/activity-groups/{id}",
            get(activity::get_activity)
                .patch(activity::update_activity)
                .delete(activity::delete_activity),
        )
        .route(
            "/todo-items",
            get(todo::list_todos).post(todo::create_todo),
        )
        .route(
            "/todo-items/{id}",
            get(todo::get_todo)
                .patch(todo::update_todo)
                .delete(todo::delete_todo),
        )
        .fallback(health::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(error::panic_response))
        .with_state(state)
}
