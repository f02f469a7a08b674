//! Authorization audit logging.

use crate::middleware::auth::types::AuthUser;
use chrono::{DateTime, Utc};
use serde::Serialize;
use taskhub_auth::Role;
use taskhub_common_core::UserId;
use tracing::info;

/// Authorization audit event.
#[derive(Debug, Serialize)]
pub struct AuthzAuditEvent {
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
    pub role: Role,
    pub requirement: String,
    pub resource_id: Option<String>,
    pub granted: bool,
    pub reason: Option<String>,
}

impl AuthzAuditEvent {
    pub fn new(
        user: &AuthUser,
        requirement: impl ToString,
        resource_id: Option<String>,
        granted: bool,
        reason: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: user.id,
            role: user.role,
            requirement: requirement.to_string(),
            resource_id,
            granted,
            reason,
        }
    }

    pub fn log(&self) {
        if self.granted {
            info!(
                event = "authz_granted",
                user_id = %self.user_id,
                role = %self.role,
                requirement = %self.requirement,
                resource_id = ?self.resource_id,
                "Authorization granted"
            );
        } else {
            info!(
                event = "authz_denied",
                user_id = %self.user_id,
                role = %self.role,
                requirement = %self.requirement,
                resource_id = ?self.resource_id,
                reason = ?self.reason,
                "Authorization denied"
            );
        }
    }
}

/// Log authorization decision.
pub fn log_authz(
    user: &AuthUser,
    requirement: impl ToString,
    resource_id: Option<String>,
    granted: bool,
    reason: Option<&str>,
) {
    AuthzAuditEvent::new(user, requirement, resource_id, granted, reason.map(String::from)).log();
}
