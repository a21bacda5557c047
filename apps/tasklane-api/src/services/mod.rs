pub mod activity_service;
pub mod todo_service;

pub use activity_service::ActivityService;
pub use todo_service::{TodoFields, TodoService};

use crate::error::ApiError;

/// Path ids that do not parse can never match a row, so they are reported as
/// not found rather than as a malformed request.
pub(crate) fn parse_id(entity: &'static str, raw: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::not_found(entity, raw)),
    }
}

pub(crate) fn require_text(field: &str, value: Option<String>) -> Result<String, ApiError> {
    crate::utils::non_empty(value).ok_or_else(|| ApiError::missing(field))
}
