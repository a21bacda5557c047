use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::Response,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::response::{created, empty, ok};

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// GET /activity-groups
pub async fn list_activities(State(state): State<AppState>) -> Result<Response, ApiError> {
    let activities = state.activity_service.list().await?;
    Ok(ok(activities))
}

/// GET /activity-groups/{id}
pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let activity = state.activity_service.get(&id).await?;
    Ok(ok(activity))
}

/// POST /activity-groups
pub async fn create_activity(
    State(state): State<AppState>,
    payload: Result<Json<ActivityRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let activity = state.activity_service.create(req.title, req.email).await?;
    Ok(created(activity))
}

/// PATCH /activity-groups/{id}
pub async fn update_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ActivityRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let activity = state
        .activity_service
        .update(&id, req.title, req.email)
        .await?;
    Ok(ok(activity))
}

/// DELETE /activity-groups/{id}
pub async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state.activity_service.delete(&id).await?;
    Ok(ok(empty()))
}
