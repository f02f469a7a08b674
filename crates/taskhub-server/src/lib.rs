//! Taskhub API Server
//!
//! HTTP server for the task manager: account management, per-user tasks
//! and an administration surface, all behind token authentication and
//! role-based authorization.
//!
//! # Architecture
//!
//! - **Routes**: endpoint definitions and per-route permission gates
//! - **Handlers**: request processing
//! - **Middleware**: authentication, authorization, rate limiting
//! - **Store**: user and task persistence (Postgres or in-memory)
//!
//! Authorization rules themselves live in `taskhub-auth`.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod request;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Server builder for constructing and running the API server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server with the given configuration.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let state = AppState::new(&config).await?;
        Ok(Self { config, state })
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone()).layer(TraceLayer::new_for_http())
    }

    /// Run the server, binding to the configured address.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!(%addr, environment = %self.config.server.environment, "Server listening");

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

        Ok(())
    }

    /// Get the server's socket address.
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        self.config.server.socket_addr()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
