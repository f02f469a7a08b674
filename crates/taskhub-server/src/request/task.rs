//! Task request bodies and list query.

use super::extract::{reject, trimmed_len_between, RequestRules};
use crate::models::{SortOrder, Task, TaskChanges, TaskPriority, TaskSortField, TaskStatus};
use crate::response::PaginationParams;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskhub_common_core::UserId;
use validator::{Validate, ValidationErrors};

const TITLE_RULE: &str = "Title must be between 3 and 200 characters";
const DUE_DATE_RULE: &str = "Due date must be in the future";

fn check_title(title: &str, errors: &mut ValidationErrors) {
    if !trimmed_len_between(title, 3, 200) {
        reject(errors, "title", "length", TITLE_RULE);
    }
}

fn check_due_date(due_date: Option<DateTime<Utc>>, errors: &mut ValidationErrors) {
    if due_date.is_some_and(|due| due <= Utc::now()) {
        reject(errors, "due_date", "future", DUE_DATE_RULE);
    }
}

fn clean_description(description: Option<String>) -> Option<String> {
    description.map(|d| d.trim().to_string())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

impl RequestRules for CreateTaskRequest {
    fn check(&self, errors: &mut ValidationErrors) {
        check_title(&self.title, errors);
        check_due_date(self.due_date, errors);
    }
}

impl CreateTaskRequest {
    /// A new task owned by `owner`, with unset fields at their defaults.
    pub fn into_task(self, owner: UserId) -> Task {
        let mut task = Task::new(owner, self.title.trim());
        task.description = clean_description(self.description);
        task.status = self.status.unwrap_or_default();
        task.priority = self.priority.unwrap_or_default();
        task.due_date = self.due_date;
        task
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

impl RequestRules for UpdateTaskRequest {
    fn check(&self, errors: &mut ValidationErrors) {
        if let Some(title) = &self.title {
            check_title(title, errors);
        }
        check_due_date(self.due_date, errors);
    }
}

impl UpdateTaskRequest {
    pub fn into_changes(self) -> TaskChanges {
        TaskChanges {
            title: self.title.map(|t| t.trim().to_string()),
            description: clean_description(self.description),
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
        }
    }
}

/// `GET /tasks` and `GET /admin/tasks` query string.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    pub page: u32,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: u32,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub sort_by: TaskSortField,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Owner filter, honoured only for callers who may see every task.
    pub user_id: Option<UserId>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for TaskListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            status: None,
            priority: None,
            sort_by: TaskSortField::default(),
            sort_order: SortOrder::default(),
            user_id: None,
        }
    }
}

impl RequestRules for TaskListQuery {}

impl TaskListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::request::validate;
    use chrono::Duration;

    #[test]
    fn test_title_is_trimmed_before_length_check() {
        let req = CreateTaskRequest {
            title: "  ab  ".into(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
        };
        assert!(matches!(validate(&req), Err(ApiError::ValidationError(f)) if f.contains_key("title")));
    }

    #[test]
    fn test_due_date_must_be_future() {
        let mut req = UpdateTaskRequest {
            due_date: Some(Utc::now() - Duration::minutes(1)),
            ..Default::default()
        };
        assert!(matches!(validate(&req), Err(ApiError::ValidationError(f)) if f.contains_key("dueDate")));

        req.due_date = Some(Utc::now() + Duration::days(1));
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_long_description_rejected() {
        let req = UpdateTaskRequest {
            description: Some("x".repeat(1001)),
            ..Default::default()
        };
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_created_task_is_trimmed() {
        let owner = UserId::new();
        let task = CreateTaskRequest {
            title: "  Write docs ".into(),
            description: Some(" soon ".into()),
            status: None,
            priority: Some(TaskPriority::High),
            due_date: None,
        }
        .into_task(owner);
        assert_eq!(task.title, "Write docs");
        assert_eq!(task.description.as_deref(), Some("soon"));
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.owner_id, owner);
    }

    #[test]
    fn test_list_query_defaults() {
        let query: TaskListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.sort_by, TaskSortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_list_query_parses_wire_names() {
        let query: TaskListQuery = serde_json::from_value(serde_json::json!({
            "status": "in-progress",
            "sortBy": "dueDate",
            "sortOrder": "asc"
        }))
        .unwrap();
        assert_eq!(query.status, Some(TaskStatus::InProgress));
        assert_eq!(query.sort_by, TaskSortField::DueDate);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }
}
