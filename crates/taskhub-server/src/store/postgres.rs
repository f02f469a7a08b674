//! Postgres-backed store.

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::config::DatabaseConfig;
use crate::models::{Task, TaskQuery, TaskSortField, TaskStats, User, UserStats};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    FromRow, PgPool, Postgres, QueryBuilder,
};
use std::str::FromStr;
use std::time::Duration;
use taskhub_common_core::{TaskId, UserId};
use tracing::info;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, is_active, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, status, priority, due_date, user_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool, verify it, and apply migrations when configured to.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url.as_deref().context("database.url is not set")?;
        info!("Creating database connection pool...");

        let connect_options = PgConnectOptions::from_str(url).context("Invalid database URL")?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
            .connect_with(connect_options)
            .await
            .context("Failed to create database pool")?;

        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .context("Database connection verification failed")?;

        if config.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            info!("Database migrations applied");
        }

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Database pool created"
        );

        Ok(Self::new(pool))
    }
}

/// Maps unique violations to the field that collided.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let field = match db_err.constraint() {
                Some(c) if c.contains("email") => "Email",
                Some(c) if c.contains("username") => "Username",
                _ => "Record",
            };
            return StoreError::Duplicate(field.to_string());
        }
    }
    StoreError::Database(err)
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_uuid(row.id),
            role: row
                .role
                .parse()
                .map_err(|_| StoreError::Corrupt(format!("user {} has role {}", row.id, row.role)))?,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: TaskId::from_uuid(row.id),
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            priority: row.priority.parse().map_err(StoreError::Corrupt)?,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            owner_id: UserId::from_uuid(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TaskStatsRow {
    total: i64,
    pending: i64,
    in_progress: i64,
    completed: i64,
    high: i64,
    medium: i64,
    low: i64,
    overdue: i64,
}

impl From<TaskStatsRow> for TaskStats {
    fn from(row: TaskStatsRow) -> Self {
        let count = |n: i64| n.max(0) as u64;
        Self {
            total: count(row.total),
            pending: count(row.pending),
            in_progress: count(row.in_progress),
            completed: count(row.completed),
            high: count(row.high),
            medium: count(row.medium),
            low: count(row.low),
            overdue: count(row.overdue),
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: User) -> StoreResult<User> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users SET username = $2, email = $3, password_hash = $4, role = $5,
                 is_active = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, offset: u64, limit: u32) -> StoreResult<(Vec<User>, u64)> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(i64::from(limit))
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((users, total.max(0) as u64))
    }

    async fn stats(&self) -> StoreResult<UserStats> {
        let (total, active, admins): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE is_active),
                    COUNT(*) FILTER (WHERE role = 'admin')
             FROM users",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(UserStats {
            total_users: total.max(0) as u64,
            active_users: active.max(0) as u64,
            admins: admins.max(0) as u64,
        })
    }
}

fn sort_expression(field: TaskSortField) -> &'static str {
    match field {
        TaskSortField::Title => "title",
        TaskSortField::CreatedAt => "created_at",
        TaskSortField::UpdatedAt => "updated_at",
        TaskSortField::DueDate => "due_date",
        TaskSortField::Priority => {
            "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END"
        }
    }
}

fn push_task_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &TaskQuery) {
    builder.push(" WHERE TRUE");
    if let Some(owner) = query.owner {
        builder.push(" AND user_id = ").push_bind(owner.as_uuid());
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(priority) = query.priority {
        builder.push(" AND priority = ").push_bind(priority.as_str());
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create(&self, task: Task) -> StoreResult<Task> {
        sqlx::query(
            "INSERT INTO tasks (id, title, description, status, priority, due_date, user_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(task.id.as_uuid())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.owner_id.as_uuid())
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        sqlx::query(
            "UPDATE tasks SET title = $2, description = $3, status = $4, priority = $5,
                 due_date = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(task.id.as_uuid())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_owner(&self, owner: UserId) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = $1")
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list(&self, query: &TaskQuery) -> StoreResult<(Vec<Task>, u64)> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        push_task_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(sort_expression(query.sort_by))
            .push(" ")
            .push(query.sort_order.as_sql())
            .push(" NULLS LAST, id LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(query.offset as i64);
        let rows = select
            .build_query_as::<TaskRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        push_task_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let tasks = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((tasks, total.max(0) as u64))
    }

    async fn stats(&self, owner: Option<UserId>, now: DateTime<Utc>) -> StoreResult<TaskStats> {
        let row = sqlx::query_as::<_, TaskStatsRow>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                    COUNT(*) FILTER (WHERE status = 'in-progress') AS in_progress,
                    COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                    COUNT(*) FILTER (WHERE priority = 'high') AS high,
                    COUNT(*) FILTER (WHERE priority = 'medium') AS medium,
                    COUNT(*) FILTER (WHERE priority = 'low') AS low,
                    COUNT(*) FILTER (
                        WHERE status <> 'completed' AND due_date IS NOT NULL AND due_date < $1
                    ) AS overdue
             FROM tasks
             WHERE ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(now)
        .bind(owner.map(|o| o.as_uuid()))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}
