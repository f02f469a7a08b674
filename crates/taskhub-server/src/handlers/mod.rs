//! Request handlers, grouped by resource.

pub mod admin;
pub mod auth;
pub mod health;
pub mod tasks;

use crate::error::{ApiError, ApiResult};
use taskhub_common_core::{TaskId, UserId};

/// Path segment → task id. Malformed ids are a client error, not a 404.
pub(crate) fn parse_task_id(raw: &str) -> ApiResult<TaskId> {
    TaskId::parse(raw).map_err(|_| ApiError::BadRequest("Invalid resource ID".into()))
}

pub(crate) fn parse_user_id(raw: &str) -> ApiResult<UserId> {
    UserId::parse(raw).map_err(|_| ApiError::BadRequest("Invalid resource ID".into()))
}
