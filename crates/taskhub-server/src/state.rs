//! Shared application state.

use crate::config::ServerConfig;
use crate::models::User;
use crate::store::{MemoryStore, PgStore, TaskStore, UserStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use taskhub_auth::{hash_password, Role, TokenService};
use tracing::{info, warn};

/// Handles shared by every request. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub started_at: Instant,
}

impl AppState {
    /// Build state from configuration, connecting to Postgres when a
    /// database URL is set.
    pub async fn new(config: &ServerConfig) -> Result<Self> {
        let state = match &config.database.url {
            Some(_) => {
                let store = Arc::new(PgStore::connect(&config.database).await?);
                Self::with_stores(config, store.clone(), store)?
            }
            None => {
                warn!("No database configured, using the in-memory store");
                Self::in_memory(config)?
            }
        };
        state.bootstrap_admin().await?;
        Ok(state)
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(config: &ServerConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(config, store.clone(), store)
    }

    pub fn with_stores(
        config: &ServerConfig,
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Result<Self> {
        let tokens = TokenService::new(config.auth.token_config())
            .context("Failed to initialise token service")?;
        Ok(Self {
            config: Arc::new(config.clone()),
            tokens: Arc::new(tokens),
            users,
            tasks,
            started_at: Instant::now(),
        })
    }

    /// Create the configured administrator if no account uses that email yet.
    async fn bootstrap_admin(&self) -> Result<()> {
        let Some(admin) = &self.config.bootstrap_admin else {
            return Ok(());
        };
        let email = admin.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Ok(());
        }

        let hash = hash_password(admin.password.expose())?;
        let user = User::new(admin.username.trim(), email, hash).with_role(Role::Admin);
        let user = self.users.create(user).await?;
        info!(user_id = %user.id, "Bootstrap administrator created");
        Ok(())
    }
}
