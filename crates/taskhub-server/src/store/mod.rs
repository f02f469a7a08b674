//! Persistence for users and tasks.
//!
//! Handlers only see the [`UserStore`] and [`TaskStore`] traits. The server
//! picks [`PgStore`] when a database URL is configured and [`MemoryStore`]
//! otherwise.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{Task, TaskQuery, TaskStats, User, UserStats};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taskhub_common_core::{TaskId, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field is already taken. Carries the field name.
    #[error("{0} already exists")]
    Duplicate(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to a model.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Email and username must be unique.
    async fn create(&self, user: User) -> StoreResult<User>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Lookup by (already normalized) email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Persist every mutable field of an existing user.
    async fn update(&self, user: &User) -> StoreResult<()>;

    /// Returns whether a user was removed.
    async fn delete(&self, id: UserId) -> StoreResult<bool>;

    /// A page of users, newest first, plus the total count.
    async fn list(&self, offset: u64, limit: u32) -> StoreResult<(Vec<User>, u64)>;

    async fn stats(&self) -> StoreResult<UserStats>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: Task) -> StoreResult<Task>;

    async fn find_by_id(&self, id: TaskId) -> StoreResult<Option<Task>>;

    async fn update(&self, task: &Task) -> StoreResult<()>;

    async fn delete(&self, id: TaskId) -> StoreResult<bool>;

    /// Remove every task of one owner. Returns how many went.
    async fn delete_by_owner(&self, owner: UserId) -> StoreResult<u64>;

    /// The requested page of matching tasks plus the total match count.
    async fn list(&self, query: &TaskQuery) -> StoreResult<(Vec<Task>, u64)>;

    /// Counters over one owner's tasks, or all tasks when `owner` is `None`.
    async fn stats(&self, owner: Option<UserId>, now: DateTime<Utc>) -> StoreResult<TaskStats>;
}
