//! Authentication middleware layer.

use super::types::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::UserStore;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use taskhub_auth::{AuthError, TokenService};
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Authentication layer configuration.
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl AuthLayer {
    /// Create new auth layer.
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.tokens.clone(), state.users.clone())
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            tokens: self.tokens.clone(),
            users: self.users.clone(),
        }
    }
}

/// Authentication middleware service.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let tokens = self.tokens.clone();
        let users = self.users.clone();
        // Take the service that was driven to readiness, leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match authenticate(req.headers(), &tokens, users.as_ref()).await {
                Ok(user) => {
                    debug!(user_id = %user.id, role = %user.role, "Request authenticated");
                    req.extensions_mut().insert(user);
                    inner.call(req).await
                }
                Err(err) => {
                    warn!(
                        path = %req.uri().path(),
                        reason = err.error_code(),
                        "Authentication rejected"
                    );
                    Ok(err.into_response())
                }
            }
        })
    }
}

/// Resolve the caller behind a request's bearer token.
///
/// The token must verify, its subject must still exist, and the account must
/// be active. Store failures surface as server errors rather than letting the
/// request through.
pub async fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenService,
    users: &dyn UserStore,
) -> Result<AuthUser, ApiError> {
    let token = extract_bearer(headers)?;
    let claims = tokens.verify_access_token(token)?;

    let user = users
        .find_by_id(claims.sub)
        .await?
        .ok_or(AuthError::IdentityNotFound)?;
    if !user.is_active {
        return Err(AuthError::AccountDeactivated.into());
    }

    Ok(AuthUser::new(&user, claims))
}

/// The token from an `Authorization: Bearer <token>` header.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::AuthenticationRequired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::store::MemoryStore;
    use taskhub_auth::{Role, TokenConfig};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    fn token_service() -> TokenService {
        TokenService::new(TokenConfig::new("access-secret", "refresh-secret")).unwrap()
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(
            extract_bearer(&HeaderMap::new()),
            Err(AuthError::AuthenticationRequired)
        );
        assert_eq!(
            extract_bearer(&headers("Basic dXNlcjpwdw==")),
            Err(AuthError::AuthenticationRequired)
        );
        assert_eq!(
            extract_bearer(&headers("Bearer ")),
            Err(AuthError::AuthenticationRequired)
        );
    }

    #[tokio::test]
    async fn test_authenticate_active_user() {
        let tokens = token_service();
        let store = MemoryStore::new();
        let user = store
            .create(User::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();

        let token = tokens.issue_access_token(&user.token_subject()).unwrap();
        let auth = authenticate(&headers(&format!("Bearer {token}")), &tokens, &store)
            .await
            .unwrap();

        assert_eq!(auth.id, user.id);
        assert_eq!(auth.role, Role::User);
        assert_eq!(auth.claims.sub, user.id);
    }

    #[tokio::test]
    async fn test_authenticate_uses_current_role() {
        let tokens = token_service();
        let store = MemoryStore::new();
        let mut user = store
            .create(User::new("alice", "alice@example.com", "hash").with_role(Role::Admin))
            .await
            .unwrap();
        let token = tokens.issue_access_token(&user.token_subject()).unwrap();

        user.role = Role::User;
        store.update(&user).await.unwrap();

        let auth = authenticate(&headers(&format!("Bearer {token}")), &tokens, &store)
            .await
            .unwrap();
        assert_eq!(auth.role, Role::User);
        assert_eq!(auth.claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_authenticate_rejects_deactivated_and_missing() {
        let tokens = token_service();
        let store = MemoryStore::new();
        let mut user = store
            .create(User::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        let token = tokens.issue_access_token(&user.token_subject()).unwrap();
        let headers = headers(&format!("Bearer {token}"));

        user.is_active = false;
        store.update(&user).await.unwrap();
        let result = authenticate(&headers, &tokens, &store).await;
        assert!(matches!(result, Err(ApiError::AccountDeactivated)));

        store.delete(user.id).await.unwrap();
        let result = authenticate(&headers, &tokens, &store).await;
        assert!(matches!(result, Err(ApiError::IdentityNotFound)));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_token() {
        let tokens = token_service();
        let store = MemoryStore::new();

        let result = authenticate(&headers("Bearer not-a-jwt"), &tokens, &store).await;
        assert!(matches!(result, Err(ApiError::InvalidToken)));

        let result = authenticate(&HeaderMap::new(), &tokens, &store).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
}
