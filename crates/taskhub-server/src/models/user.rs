//! User accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use taskhub_auth::{Role, TokenSubject};
use taskhub_common_core::UserId;

/// A stored account. The password hash never leaves the server; use
/// [`UserView`] for anything that is serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A new active account with the default role.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: Role::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Identity embedded in access tokens.
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

/// Public projection of a [`User`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("alice", "alice@example.com", "hash");
        assert_eq!(user.role, Role::User);
        assert!(user.is_active);
    }

    #[test]
    fn test_view_hides_password_hash() {
        let user = User::new("alice", "alice@example.com", "$argon2id$secret");
        let json = serde_json::to_string(&user.view()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"isActive\":true"));
    }
}
