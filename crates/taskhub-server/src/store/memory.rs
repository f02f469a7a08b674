//! In-process store used for development and tests.

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{Task, TaskQuery, TaskStats, User, UserStats};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use taskhub_auth::Role;
use taskhub_common_core::{TaskId, UserId};

/// Users and tasks in hash maps behind `RwLock`s. Locks are never held
/// across an await point.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_unique(users: &HashMap<UserId, User>, candidate: &User) -> StoreResult<()> {
    for user in users.values().filter(|u| u.id != candidate.id) {
        if user.email == candidate.email {
            return Err(StoreError::Duplicate("Email".into()));
        }
        if user.username == candidate.username {
            return Err(StoreError::Duplicate("Username".into()));
        }
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write();
        ensure_unique(&users, &user)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write();
        ensure_unique(&users, user)?;
        if let Some(slot) = users.get_mut(&user.id) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        Ok(self.users.write().remove(&id).is_some())
    }

    async fn list(&self, offset: u64, limit: u32) -> StoreResult<(Vec<User>, u64)> {
        let users = self.users.read();
        let mut all: Vec<&User> = users.values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let total = all.len() as u64;
        let page = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn stats(&self) -> StoreResult<UserStats> {
        let users = self.users.read();
        Ok(UserStats {
            total_users: users.len() as u64,
            active_users: users.values().filter(|u| u.is_active).count() as u64,
            admins: users.values().filter(|u| u.role == Role::Admin).count() as u64,
        })
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, task: Task) -> StoreResult<Task> {
        self.tasks.write().insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.tasks.read().get(&id).cloned())
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        if let Some(slot) = self.tasks.write().get_mut(&task.id) {
            *slot = task.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> StoreResult<bool> {
        Ok(self.tasks.write().remove(&id).is_some())
    }

    async fn delete_by_owner(&self, owner: UserId) -> StoreResult<u64> {
        let mut tasks = self.tasks.write();
        let before = tasks.len();
        tasks.retain(|_, task| task.owner_id != owner);
        Ok((before - tasks.len()) as u64)
    }

    async fn list(&self, query: &TaskQuery) -> StoreResult<(Vec<Task>, u64)> {
        let tasks = self.tasks.read();
        let mut matching: Vec<&Task> = tasks.values().filter(|t| query.matches(t)).collect();
        matching.sort_by(|a, b| query.sort_by.compare(query.sort_order, a, b));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn stats(&self, owner: Option<UserId>, now: DateTime<Utc>) -> StoreResult<TaskStats> {
        let tasks = self.tasks.read();
        let scoped = tasks
            .values()
            .filter(|t| owner.map_or(true, |owner| t.owner_id == owner));
        Ok(TaskStats::tally(scoped, now))
    }
}
