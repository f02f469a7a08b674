//! Liveness and service banner endpoints. None of these require a token.

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

/// `GET /`
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Task Manager API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "v1": "/api/v1",
            "v2": "/api/v2",
            "health": "/health"
        }
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Server is healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "environment": state.config.server.environment,
    }))
}

/// `GET /api/v1/health`
pub async fn v1_health(State(state): State<AppState>) -> impl IntoResponse {
    version_health(&state, "v1")
}

/// `GET /api/v2/health`
pub async fn v2_health(State(state): State<AppState>) -> impl IntoResponse {
    version_health(&state, "v2")
}

fn version_health(state: &AppState, version: &str) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": format!("API {version} is running"),
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}
