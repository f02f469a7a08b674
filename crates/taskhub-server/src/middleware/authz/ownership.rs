//! Ownership enforcement for single-task operations.

use super::audit::log_authz;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::types::AuthUser;
use crate::models::Task;
use crate::store::TaskStore;
use taskhub_auth::{check_ownership, Owned, Permission, ScopedAction};
use taskhub_common_core::{TaskId, UserId};

/// Load a task and make sure `user` may perform `action` on it.
///
/// Holders of the matching all-tasks permission pass the ownership gate
/// without it being consulted; a missing task is then reported as not found.
pub async fn load_owned_task(
    tasks: &dyn TaskStore,
    user: &AuthUser,
    id: TaskId,
    action: ScopedAction,
) -> ApiResult<Task> {
    let task = tasks.find_by_id(id).await?;

    if let Err(err) = check_ownership(user.role, user.id, action, task.as_ref()) {
        log_authz(
            user,
            action.own_permission(),
            Some(id.to_string()),
            false,
            Some(&err.to_string()),
        );
        return Err(err.into());
    }

    let task = task.ok_or_else(|| ApiError::NotFound(Task::KIND.to_string()))?;
    log_authz(user, action.own_permission(), Some(id.to_string()), true, None);
    Ok(task)
}

/// Owner filter for task listings: everyone's tasks for holders of
/// `read:all_tasks`, otherwise only the caller's own.
pub fn task_scope(user: &AuthUser) -> Option<UserId> {
    if user.can(Permission::ReadAllTasks) {
        None
    } else {
        Some(user.id)
    }
}
