//! Administration handlers. Every route here sits behind the admin role gate.

use super::parse_user_id;
use crate::error::{ApiError, ApiResult, ErrorContext};
use crate::middleware::Auth;
use crate::models::{SystemStats, UserTaskSummary, UserView};
use crate::request::{UpdateRoleRequest, ValidJson, ValidQuery};
use crate::response::{message_only, ok, paginated, PaginationParams};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
};
use chrono::Utc;
use serde::Serialize;
use taskhub_auth::{ensure_not_self, ensure_role_change_allowed, Role, SelfAction};
use taskhub_common_core::UserId;
use tracing::info;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserDetail {
    user: UserView,
    task_stats: UserTaskSummary,
}

#[derive(Serialize)]
struct RoleChanged {
    id: UserId,
    username: String,
    email: String,
    role: Role,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusChanged {
    id: UserId,
    username: String,
    email: String,
    is_active: bool,
}

/// `GET /admin/users`
pub async fn list_users(
    State(state): State<AppState>,
    ValidQuery(page): ValidQuery<PaginationParams>,
) -> ApiResult<Response> {
    let (users, total) = state.users.list(page.offset(), page.limit()).await?;
    let views: Vec<UserView> = users.iter().map(UserView::from).collect();
    Ok(paginated(views, page.meta(total)))
}

/// `GET /admin/users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_user_id(&id)?;
    let user = state.users.find_by_id(id).await?.not_found("User")?;
    let stats = state.tasks.stats(Some(id), Utc::now()).await?;

    let detail = UserDetail {
        user: user.view(),
        task_stats: stats.into(),
    };
    Ok(ok(detail, "User retrieved successfully"))
}

/// `PATCH /admin/users/:id/role`
pub async fn update_role(
    State(state): State<AppState>,
    Auth(admin): Auth,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateRoleRequest>,
) -> ApiResult<Response> {
    let id = parse_user_id(&id)?;
    let mut user = state.users.find_by_id(id).await?.not_found("User")?;
    ensure_role_change_allowed(admin.id, user.id, user.role, req.role)?;

    if user.role != req.role {
        let previous = user.role;
        user.role = req.role;
        user.touch();
        state.users.update(&user).await?;
        info!(
            admin_id = %admin.id,
            user_id = %user.id,
            from = %previous,
            to = %user.role,
            "User role changed"
        );
    }

    let body = RoleChanged {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    };
    Ok(ok(body, "User role updated successfully"))
}

/// `PATCH /admin/users/:id/status`
///
/// Flips the active flag. A deactivated user is rejected on their next
/// authenticated request.
pub async fn toggle_status(
    State(state): State<AppState>,
    Auth(admin): Auth,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_user_id(&id)?;
    ensure_not_self(admin.id, id, SelfAction::ChangeStatus)?;
    let mut user = state.users.find_by_id(id).await?.not_found("User")?;

    user.is_active = !user.is_active;
    user.touch();
    state.users.update(&user).await?;

    let verb = if user.is_active { "activated" } else { "deactivated" };
    info!(admin_id = %admin.id, user_id = %user.id, active = user.is_active, "User status changed");

    let body = StatusChanged {
        id: user.id,
        username: user.username,
        email: user.email,
        is_active: user.is_active,
    };
    Ok(ok(body, format!("User has been {verb} successfully")))
}

/// `DELETE /admin/users/:id`
///
/// Removes the user together with every task they own.
pub async fn delete_user(
    State(state): State<AppState>,
    Auth(admin): Auth,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_user_id(&id)?;
    ensure_not_self(admin.id, id, SelfAction::Delete)?;
    state.users.find_by_id(id).await?.not_found("User")?;

    let removed_tasks = state.tasks.delete_by_owner(id).await?;
    if !state.users.delete(id).await? {
        return Err(ApiError::NotFound("User".into()));
    }
    info!(admin_id = %admin.id, user_id = %id, removed_tasks, "User deleted");

    Ok(message_only("User deleted successfully"))
}

/// `GET /admin/stats`
pub async fn system_stats(State(state): State<AppState>) -> ApiResult<Response> {
    let users = state.users.stats().await?;
    let tasks = state.tasks.stats(None, Utc::now()).await?;

    let stats = SystemStats {
        users,
        tasks: tasks.into(),
    };
    Ok(ok(stats, "System statistics retrieved successfully"))
}
