use std::any::Any;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::response::ApiResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field is missing, empty or malformed.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} with ID {id} Not Found")]
    NotFound { entity: &'static str, id: String },

    /// The request points at a parent row that does not exist.
    #[error("{0}")]
    Reference(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ApiError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn missing(field: &str) -> Self {
        ApiError::Validation(format!("{} cannot be null", field))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Reference(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!("Rejected query string: {}", rejection.body_text());
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Internal(e) => {
                error!("Request failed: {:#}", e);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiResponse::failure(status, message))).into_response()
    }
}

/// Renders a handler panic as the standard 500 envelope.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (
        status,
        Json(ApiResponse::failure(status, "Internal Server Error".to_string())),
    )
        .into_response()
}
