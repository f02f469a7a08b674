//! Request data transfer objects and validating extractors.

pub mod admin;
pub mod auth;
pub mod extract;
pub mod task;

pub use admin::UpdateRoleRequest;
pub use auth::{
    normalize_email, ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
};
pub use extract::{validate, RequestRules, ValidJson, ValidQuery};
pub use task::{CreateTaskRequest, TaskListQuery, UpdateTaskRequest};
