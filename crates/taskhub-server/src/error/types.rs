//! API error types.

use axum::http::StatusCode;
use std::collections::HashMap;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error enum covering all error cases.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed")]
    ValidationError(HashMap<String, Vec<String>>),

    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    #[error("{0}")]
    SelfActionForbidden(String),

    // 401 Unauthorized
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User account is deactivated")]
    AccountDeactivated,

    #[error("User no longer exists")]
    IdentityNotFound,

    // 403 Forbidden
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("{0}")]
    ResourceAccessDenied(String),

    /// Correct credentials for a deactivated account at login.
    #[error("User account is inactive")]
    AccountInactive,

    // 404 Not Found
    #[error("{0} not found")]
    NotFound(String),

    // 409 Conflict
    #[error("{0}")]
    DuplicateEntry(String),

    // 429 Too Many Requests
    #[error("Too many requests, please try again later")]
    RateLimited { retry_after: u64 },

    // 500 Internal Server Error
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error("Database error")]
    Database(#[source] sqlx::Error),

    #[error("Server misconfigured: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::ValidationError(_)
            | Self::InvalidQueryParam(_)
            | Self::SelfActionForbidden(_) => StatusCode::BAD_REQUEST,

            Self::Unauthorized
            | Self::InvalidCredentials
            | Self::IncorrectPassword
            | Self::InvalidToken
            | Self::AccountDeactivated
            | Self::IdentityNotFound => StatusCode::UNAUTHORIZED,

            Self::InsufficientPermissions
            | Self::ResourceAccessDenied(_)
            | Self::AccountInactive => StatusCode::FORBIDDEN,

            Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::DuplicateEntry(_) => StatusCode::CONFLICT,

            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            Self::Internal(_) | Self::Database(_) | Self::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::ValidationError(_) => "validation_error",
            Self::InvalidQueryParam(_) => "invalid_query_param",
            Self::SelfActionForbidden(_) => "self_action_forbidden",
            Self::Unauthorized => "unauthorized",
            Self::InvalidCredentials => "invalid_credentials",
            Self::IncorrectPassword => "incorrect_password",
            Self::InvalidToken => "invalid_token",
            Self::AccountDeactivated => "account_deactivated",
            Self::IdentityNotFound => "identity_not_found",
            Self::InsufficientPermissions => "insufficient_permissions",
            Self::ResourceAccessDenied(_) => "resource_access_denied",
            Self::AccountInactive => "account_inactive",
            Self::NotFound(_) => "not_found",
            Self::DuplicateEntry(_) => "duplicate_entry",
            Self::RateLimited { .. } => "rate_limited",
            Self::Internal(_) => "internal_error",
            Self::Database(_) => "database_error",
            Self::Configuration(_) => "configuration_error",
        }
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Authentication failures, as opposed to authorization failures.
    pub fn is_auth_failure(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }
}
