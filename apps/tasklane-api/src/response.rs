use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "Success".to_string(),
            message: "Success".to_string(),
            data,
        }
    }
}

impl ApiResponse<Value> {
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.into(),
            data: empty(),
        }
    }
}

/// The `{}` payload.
pub fn empty() -> Value {
    Value::Object(Map::new())
}

pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}
