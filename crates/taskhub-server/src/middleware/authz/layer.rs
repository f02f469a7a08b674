//! Authorization middleware layer.

use super::audit::log_authz;
use crate::{error::ApiError, middleware::auth::types::AuthUser};
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use taskhub_auth::{Permission, Role};
use tower::{Layer, Service};
use tracing::warn;

/// What a route demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The caller's role must grant this permission.
    Permission(Permission),
    /// The caller's role must be one of these.
    AnyRole(&'static [Role]),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permission(permission) => write!(f, "{permission}"),
            Self::AnyRole(roles) => {
                f.write_str("role:")?;
                for (i, role) in roles.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{role}")?;
                }
                Ok(())
            }
        }
    }
}

impl Requirement {
    pub fn is_met_by(&self, user: &AuthUser) -> bool {
        match self {
            Self::Permission(permission) => user.can(*permission),
            Self::AnyRole(roles) => roles.contains(&user.role),
        }
    }
}

/// Check a requirement against the (possibly missing) authenticated caller,
/// recording the decision.
pub fn check_requirement(
    user: Option<&AuthUser>,
    requirement: Requirement,
) -> Result<(), ApiError> {
    let Some(user) = user else {
        warn!(%requirement, "Authorization check without authentication");
        return Err(ApiError::Unauthorized);
    };

    if requirement.is_met_by(user) {
        log_authz(user, requirement, None, true, None);
        Ok(())
    } else {
        log_authz(user, requirement, None, false, Some("insufficient permissions"));
        Err(ApiError::InsufficientPermissions)
    }
}

/// Authorization layer configuration.
#[derive(Clone)]
pub struct AuthzLayer {
    requirement: Requirement,
}

impl AuthzLayer {
    pub fn new(requirement: Requirement) -> Self {
        Self { requirement }
    }

    /// Require a single permission.
    pub fn permission(permission: Permission) -> Self {
        Self::new(Requirement::Permission(permission))
    }

    /// Require one of the listed roles.
    pub fn roles(roles: &'static [Role]) -> Self {
        Self::new(Requirement::AnyRole(roles))
    }

    pub fn admin() -> Self {
        Self::roles(&[Role::Admin])
    }
}

impl<S> Layer<S> for AuthzLayer {
    type Service = AuthzMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthzMiddleware {
            inner,
            requirement: self.requirement,
        }
    }
}

#[derive(Clone)]
pub struct AuthzMiddleware<S> {
    inner: S,
    requirement: Requirement,
}

impl<S> Service<Request<Body>> for AuthzMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let requirement = self.requirement;
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            if let Err(err) = check_requirement(req.extensions().get::<AuthUser>(), requirement) {
                return Ok(err.into_response());
            }
            inner.call(req).await
        })
    }
}
