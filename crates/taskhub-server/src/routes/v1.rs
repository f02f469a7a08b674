//! API v1 routes.
//!
//! Every protected router is wrapped in [`AuthLayer`] first, then gated per
//! route by [`AuthzLayer`]. `route_layer` only wraps matched routes, so an
//! unknown path still falls through to the 404 handler.

use crate::handlers::{admin, auth, health, tasks};
use crate::middleware::{AuthLayer, AuthzLayer, RateLimitLayer};
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::time::Duration;
use taskhub_auth::Permission;

/// Create the v1 API router.
pub fn router(state: &AppState) -> Router<AppState> {
    let limits = &state.config.rate_limit;
    let auth_limit = limits.enabled.then(|| {
        RateLimitLayer::new(limits.auth_requests, Duration::from_secs(limits.auth_window_secs))
            .trust_forwarded(limits.trust_proxy)
    });

    let router = Router::new()
        .route("/health", get(health::v1_health))
        .nest("/auth", auth_routes(state, auth_limit))
        .nest("/tasks", task_routes(state))
        .nest("/admin", admin_routes(state));

    if limits.enabled {
        router.layer(
            RateLimitLayer::new(limits.api_requests, Duration::from_secs(limits.api_window_secs))
                .trust_forwarded(limits.trust_proxy),
        )
    } else {
        router
    }
}

fn auth_routes(state: &AppState, limit: Option<RateLimitLayer>) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh));
    let public = match limit {
        Some(layer) => public.route_layer(layer),
        None => public,
    };

    let authenticated = Router::new()
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(auth::profile).route_layer(AuthzLayer::permission(Permission::ReadOwnProfile)),
        )
        .route(
            "/change-password",
            put(auth::change_password)
                .route_layer(AuthzLayer::permission(Permission::UpdateOwnProfile)),
        )
        .route_layer(AuthLayer::from_state(state));

    public.merge(authenticated)
}

fn task_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(tasks::list_tasks)
                .route_layer(AuthzLayer::permission(Permission::ReadOwnTasks))
                .merge(
                    post(tasks::create_task)
                        .route_layer(AuthzLayer::permission(Permission::CreateTask)),
                ),
        )
        .route(
            "/stats",
            get(tasks::task_stats).route_layer(AuthzLayer::permission(Permission::ReadOwnTasks)),
        )
        .route(
            "/:id",
            get(tasks::get_task)
                .route_layer(AuthzLayer::permission(Permission::ReadOwnTasks))
                .merge(
                    put(tasks::update_task)
                        .route_layer(AuthzLayer::permission(Permission::UpdateOwnTasks)),
                )
                .merge(
                    delete(tasks::delete_task)
                        .route_layer(AuthzLayer::permission(Permission::DeleteOwnTasks)),
                ),
        )
        .route_layer(AuthLayer::from_state(state))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(admin::list_users).route_layer(AuthzLayer::permission(Permission::ReadAllUsers)),
        )
        .route(
            "/users/:id",
            get(admin::get_user)
                .route_layer(AuthzLayer::permission(Permission::ReadAllUsers))
                .merge(
                    delete(admin::delete_user)
                        .route_layer(AuthzLayer::permission(Permission::DeleteUsers)),
                ),
        )
        .route(
            "/users/:id/role",
            patch(admin::update_role)
                .route_layer(AuthzLayer::permission(Permission::UpdateAllUsers)),
        )
        .route(
            "/users/:id/status",
            patch(admin::toggle_status)
                .route_layer(AuthzLayer::permission(Permission::UpdateAllUsers)),
        )
        .route(
            "/tasks",
            get(tasks::list_tasks).route_layer(AuthzLayer::permission(Permission::ReadAllTasks)),
        )
        .route("/stats", get(admin::system_stats))
        .route_layer(AuthzLayer::admin())
        .route_layer(AuthLayer::from_state(state))
}
