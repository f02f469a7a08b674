//! Authentication types.

use crate::models::User;
use taskhub_auth::{has_permission, AccessClaims, Permission, Role};
use taskhub_common_core::UserId;

/// Authenticated caller, attached to request extensions by `AuthLayer`.
///
/// `role` and `is_active` come from the identity store at request time, not
/// from the token, so a role change or deactivation applies on the next
/// request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub claims: AccessClaims,
}

impl AuthUser {
    pub fn new(user: &User, claims: AccessClaims) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
            claims,
        }
    }

    /// Whether the caller's role grants `permission`.
    pub fn can(&self, permission: Permission) -> bool {
        has_permission(self.role, permission)
    }
}
