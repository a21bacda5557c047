use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::response::{ApiResponse, empty};

pub async fn welcome() -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse {
            status: "Success".to_string(),
            message: "Welcome to API Todo".to_string(),
            data: empty(),
        }),
    )
        .into_response()
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn not_found() -> Response {
    let status = StatusCode::NOT_FOUND;
    (status, Json(ApiResponse::failure(status, "Route not found"))).into_response()
}
