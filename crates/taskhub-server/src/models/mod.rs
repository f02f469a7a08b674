//! Domain models.

pub mod stats;
pub mod task;
pub mod user;

pub use stats::{SystemStats, SystemTaskStats, TaskStats, UserStats, UserTaskSummary};
pub use task::{SortOrder, Task, TaskChanges, TaskPriority, TaskQuery, TaskSortField, TaskStatus};
pub use user::{User, UserView};
