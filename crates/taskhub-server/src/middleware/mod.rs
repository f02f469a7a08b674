//! Middleware for the taskhub API server.

pub mod auth;
pub mod authz;
pub mod rate_limit;

pub use auth::{Auth, AuthLayer, AuthMiddleware, AuthUser};
pub use authz::{
    check_requirement, load_owned_task, log_authz, task_scope, AuthzLayer, AuthzMiddleware,
    Requirement,
};
pub use rate_limit::{
    InMemoryStore, RateLimitConfig, RateLimitLayer, RateLimitMiddleware, RateLimitState,
    RateLimitStore,
};
