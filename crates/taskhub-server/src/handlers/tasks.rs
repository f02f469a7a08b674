//! Task handlers.
//!
//! Route layers have already checked the caller's permission; single-task
//! handlers additionally go through [`load_owned_task`] so a user can only
//! touch tasks they own.

use super::parse_task_id;
use crate::error::ApiResult;
use crate::middleware::{load_owned_task, task_scope, Auth};
use crate::models::{TaskQuery, TaskStats};
use crate::request::{CreateTaskRequest, TaskListQuery, UpdateTaskRequest, ValidJson, ValidQuery};
use crate::response::{created, message_only, ok, paginated};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
};
use chrono::Utc;
use taskhub_auth::ScopedAction;
use tracing::{debug, info};

/// `POST /tasks`
pub async fn create_task(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(req): ValidJson<CreateTaskRequest>,
) -> ApiResult<Response> {
    let task = state.tasks.create(req.into_task(user.id)).await?;
    info!(task_id = %task.id, user_id = %user.id, "Task created");
    Ok(created(task, "Task created successfully"))
}

/// `GET /tasks` and `GET /admin/tasks`
///
/// Callers without `read:all_tasks` only ever see their own tasks; the
/// `userId` filter applies to the rest.
pub async fn list_tasks(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidQuery(query): ValidQuery<TaskListQuery>,
) -> ApiResult<Response> {
    let page = query.pagination();
    let filter = TaskQuery {
        owner: task_scope(&user).or(query.user_id),
        status: query.status,
        priority: query.priority,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
        offset: page.offset(),
        limit: page.limit(),
    };

    let (tasks, total) = state.tasks.list(&filter).await?;
    debug!(user_id = %user.id, returned = tasks.len(), total, "Listed tasks");
    Ok(paginated(tasks, page.meta(total)))
}

/// `GET /tasks/stats`
pub async fn task_stats(State(state): State<AppState>, Auth(user): Auth) -> ApiResult<Response> {
    let stats: TaskStats = state.tasks.stats(task_scope(&user), Utc::now()).await?;
    Ok(ok(stats, "Task statistics retrieved successfully"))
}

/// `GET /tasks/:id`
pub async fn get_task(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_task_id(&id)?;
    let task = load_owned_task(state.tasks.as_ref(), &user, id, ScopedAction::Read).await?;
    Ok(ok(task, "Task retrieved successfully"))
}

/// `PUT /tasks/:id`
pub async fn update_task(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<UpdateTaskRequest>,
) -> ApiResult<Response> {
    let id = parse_task_id(&id)?;
    let mut task = load_owned_task(state.tasks.as_ref(), &user, id, ScopedAction::Update).await?;

    if task.apply(req.into_changes()) {
        state.tasks.update(&task).await?;
        info!(task_id = %task.id, user_id = %user.id, "Task updated");
    }
    Ok(ok(task, "Task updated successfully"))
}

/// `DELETE /tasks/:id`
pub async fn delete_task(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_task_id(&id)?;
    load_owned_task(state.tasks.as_ref(), &user, id, ScopedAction::Delete).await?;

    state.tasks.delete(id).await?;
    info!(task_id = %id, user_id = %user.id, "Task deleted");
    Ok(message_only("Task deleted successfully"))
}
