//! Error response implementation.

use super::types::ApiError;
use crate::store::StoreError;
use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use taskhub_auth::AuthError;
use tracing::{error, warn};
use validator::ValidationErrors;

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<HashMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(
                error = ?self,
                code = self.error_code(),
                "Server error occurred"
            );
        } else if self.is_auth_failure() {
            warn!(
                error = %self,
                code = self.error_code(),
                "Auth error occurred"
            );
        }

        let status = self.status_code();
        let code = self.error_code();

        let (message, fields, retry_after) = match &self {
            ApiError::ValidationError(field_errors) => {
                (self.to_string(), Some(field_errors.clone()), None)
            }
            ApiError::RateLimited { retry_after } => (self.to_string(), None, Some(*retry_after)),
            ApiError::Internal(err) => {
                // Don't expose internal error details in production
                let message = if cfg!(debug_assertions) {
                    format!("{}: {}", self, err)
                } else {
                    "An internal error occurred".to_string()
                };
                (message, None, None)
            }
            ApiError::Database(err) => {
                let message = if cfg!(debug_assertions) {
                    format!("Database error: {}", err)
                } else {
                    "A database error occurred".to_string()
                };
                (message, None, None)
            }
            _ => (self.to_string(), None, None),
        };

        let body = ErrorResponse {
            success: false,
            message: message.clone(),
            error: ErrorBody {
                code,
                message,
                fields,
                retry_after,
            },
        };

        let mut response = (status, Json(body)).into_response();

        if let ApiError::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }

        response
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired => ApiError::Unauthorized,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::InvalidOrExpiredToken => ApiError::InvalidToken,
            AuthError::AccountDeactivated => ApiError::AccountDeactivated,
            AuthError::IdentityNotFound => ApiError::IdentityNotFound,
            AuthError::InsufficientPermissions => ApiError::InsufficientPermissions,
            AuthError::ResourceNotFound(kind) => ApiError::NotFound(kind.to_string()),
            err @ AuthError::AccessDenied(_) => ApiError::ResourceAccessDenied(err.to_string()),
            err @ AuthError::SelfActionForbidden(_) => {
                ApiError::SelfActionForbidden(err.to_string())
            }
            err @ (AuthError::ConfigurationMissing(_) | AuthError::SharedSigningSecret) => {
                ApiError::Configuration(err.to_string())
            }
            err @ (AuthError::PasswordHash | AuthError::TokenSigning) => {
                ApiError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => {
                ApiError::DuplicateEntry(format!("{field} already exists"))
            }
            StoreError::Database(err) => ApiError::from(err),
            err @ StoreError::Corrupt(_) => ApiError::Internal(anyhow::Error::new(err)),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Record".into()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                ApiError::DuplicateEntry(db_err.message().to_string())
            }
            _ => ApiError::Database(err),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (camel_case(&field), messages)
            })
            .collect();
        ApiError::ValidationError(fields)
    }
}

/// Request DTO fields are snake_case in Rust and camelCase on the wire.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use taskhub_auth::SelfAction;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let response = ApiError::InsufficientPermissions.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Insufficient permissions");
        assert_eq!(body["error"]["code"], "insufficient_permissions");
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited { retry_after: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");

        let body = body_json(response).await;
        assert_eq!(body["error"]["retryAfter"], 42);
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::InvalidOrExpiredToken),
            ApiError::InvalidToken
        ));
        assert!(matches!(
            ApiError::from(AuthError::ResourceNotFound("Task")),
            ApiError::NotFound(kind) if kind == "Task"
        ));

        let err = ApiError::from(AuthError::SelfActionForbidden(SelfAction::Delete));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "You cannot delete yourself");

        let err = ApiError::from(AuthError::AccessDenied("Task"));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = ApiError::from(AuthError::TokenSigning);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "internal_error");
    }

    #[test]
    fn test_duplicate_store_error() {
        let err = ApiError::from(StoreError::Duplicate("Email".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("due_date"), "dueDate");
        assert_eq!(camel_case("confirm_new_password"), "confirmNewPassword");
        assert_eq!(camel_case("title"), "title");
    }
}
