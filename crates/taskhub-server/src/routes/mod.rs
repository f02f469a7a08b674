//! Route configuration for the taskhub API server.

mod v1;

use crate::config::CorsConfig;
use crate::error::ApiError;
use crate::handlers::health;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method, Uri},
    routing::get,
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;

    // Common middleware stack applied to all routes
    let common_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(server.body_limit_bytes))
        .layer(cors_layer(&state.config.cors))
        .layer(TimeoutLayer::new(server.request_timeout()));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/api/v1", v1::router(&state))
        .route("/api/v2/health", get(health::v2_health))
        .fallback(not_found)
        .layer(common_middleware)
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age_secs))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {}", uri.path()))
}
