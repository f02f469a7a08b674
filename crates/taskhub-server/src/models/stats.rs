//! Aggregate counters reported by the stats endpoints.

use super::task::{Task, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Task counters for one owner or for everyone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    /// Open tasks whose due date has passed.
    pub overdue: u64,
}

impl TaskStats {
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>, now: DateTime<Utc>) -> Self {
        let mut stats = Self::default();
        for task in tasks {
            stats.record(task, now);
        }
        stats
    }

    fn record(&mut self, task: &Task, now: DateTime<Utc>) {
        self.total += 1;
        match task.status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Completed => self.completed += 1,
        }
        match task.priority {
            TaskPriority::High => self.high += 1,
            TaskPriority::Medium => self.medium += 1,
            TaskPriority::Low => self.low += 1,
        }
        if task.is_overdue(now) {
            self.overdue += 1;
        }
    }
}

/// Per-user task summary on the admin user detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserTaskSummary {
    pub total: u64,
    pub completed: u64,
}

impl From<TaskStats> for UserTaskSummary {
    fn from(stats: TaskStats) -> Self {
        Self {
            total: stats.total,
            completed: stats.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: u64,
    pub active_users: u64,
    pub admins: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemTaskStats {
    pub total_tasks: u64,
    pub completed: u64,
    pub pending: u64,
    pub in_progress: u64,
}

impl From<TaskStats> for SystemTaskStats {
    fn from(stats: TaskStats) -> Self {
        Self {
            total_tasks: stats.total,
            completed: stats.completed,
            pending: stats.pending,
            in_progress: stats.in_progress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub users: UserStats,
    pub tasks: SystemTaskStats,
}
