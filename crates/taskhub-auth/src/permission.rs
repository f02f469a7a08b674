//! Role → permission table and the permission checker.
//!
//! Roles and permissions are closed enums, so adding a role forces every
//! `match` below to be revisited. Permission sets are additive: a role holds
//! exactly the permissions listed for it and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Atomic capabilities a role may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Create a task owned by the caller.
    #[serde(rename = "create:task")]
    CreateTask,
    /// Read tasks the caller owns.
    #[serde(rename = "read:own_tasks")]
    ReadOwnTasks,
    /// Read any task.
    #[serde(rename = "read:all_tasks")]
    ReadAllTasks,
    /// Update tasks the caller owns.
    #[serde(rename = "update:own_tasks")]
    UpdateOwnTasks,
    /// Update any task.
    #[serde(rename = "update:all_tasks")]
    UpdateAllTasks,
    /// Delete tasks the caller owns.
    #[serde(rename = "delete:own_tasks")]
    DeleteOwnTasks,
    /// Delete any task.
    #[serde(rename = "delete:all_tasks")]
    DeleteAllTasks,
    /// Read the caller's own profile.
    #[serde(rename = "read:own_profile")]
    ReadOwnProfile,
    /// Read any user.
    #[serde(rename = "read:all_users")]
    ReadAllUsers,
    /// Update the caller's own profile.
    #[serde(rename = "update:own_profile")]
    UpdateOwnProfile,
    /// Update any user, including role and status.
    #[serde(rename = "update:all_users")]
    UpdateAllUsers,
    /// Delete users.
    #[serde(rename = "delete:users")]
    DeleteUsers,
}

impl Permission {
    /// Every permission, in declaration order.
    pub const ALL: [Permission; 12] = [
        Permission::CreateTask,
        Permission::ReadOwnTasks,
        Permission::ReadAllTasks,
        Permission::UpdateOwnTasks,
        Permission::UpdateAllTasks,
        Permission::DeleteOwnTasks,
        Permission::DeleteAllTasks,
        Permission::ReadOwnProfile,
        Permission::ReadAllUsers,
        Permission::UpdateOwnProfile,
        Permission::UpdateAllUsers,
        Permission::DeleteUsers,
    ];

    /// Wire name, e.g. `read:all_tasks`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTask => "create:task",
            Self::ReadOwnTasks => "read:own_tasks",
            Self::ReadAllTasks => "read:all_tasks",
            Self::UpdateOwnTasks => "update:own_tasks",
            Self::UpdateAllTasks => "update:all_tasks",
            Self::DeleteOwnTasks => "delete:own_tasks",
            Self::DeleteAllTasks => "delete:all_tasks",
            Self::ReadOwnProfile => "read:own_profile",
            Self::ReadAllUsers => "read:all_users",
            Self::UpdateOwnProfile => "update:own_profile",
            Self::UpdateAllUsers => "update:all_users",
            Self::DeleteUsers => "delete:users",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Named bundle of permissions assigned to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account, scoped to its own tasks and profile.
    #[default]
    User,
    /// Administrator with access to every task and user.
    Admin,
}

const USER_PERMISSIONS: &[Permission] = &[
    Permission::CreateTask,
    Permission::ReadOwnTasks,
    Permission::UpdateOwnTasks,
    Permission::DeleteOwnTasks,
    Permission::ReadOwnProfile,
    Permission::UpdateOwnProfile,
];

const ADMIN_PERMISSIONS: &[Permission] = &Permission::ALL;

impl Role {
    /// Every role.
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    /// The static permission set for this role.
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Self::User => USER_PERMISSIONS,
            Self::Admin => ADMIN_PERMISSIONS,
        }
    }

    /// Relative privilege, higher outranks lower.
    pub fn privilege(self) -> u8 {
        match self {
            Self::User => 0,
            Self::Admin => 10,
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

/// A role or permission name outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);

/// Whether `role` holds `permission`.
pub fn has_permission(role: Role, permission: Permission) -> bool {
    role.permissions().contains(&permission)
}

/// Checker for role names coming from outside the type system.
///
/// Unknown names hold no permissions.
pub fn has_permission_named(role: &str, permission: Permission) -> bool {
    role.parse::<Role>()
        .map(|role| has_permission(role, permission))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_user_is_scoped_to_own_resources() {
        assert!(has_permission(Role::User, Permission::CreateTask));
        assert!(has_permission(Role::User, Permission::ReadOwnTasks));
        assert!(has_permission(Role::User, Permission::UpdateOwnProfile));
        assert!(!has_permission(Role::User, Permission::ReadAllTasks));
        assert!(!has_permission(Role::User, Permission::UpdateAllTasks));
        assert!(!has_permission(Role::User, Permission::DeleteAllTasks));
        assert!(!has_permission(Role::User, Permission::ReadAllUsers));
        assert!(!has_permission(Role::User, Permission::DeleteUsers));
    }

    #[test]
    fn test_admin_holds_everything() {
        for permission in Permission::ALL {
            assert!(has_permission(Role::Admin, permission), "{permission}");
        }
    }

    #[test]
    fn test_unknown_role_fails_closed() {
        for permission in Permission::ALL {
            assert!(!has_permission_named("superuser", permission));
            assert!(!has_permission_named("", permission));
            assert!(!has_permission_named("ADMIN", permission));
        }
    }

    #[test]
    fn test_named_checker_matches_typed_checker() {
        assert!(has_permission_named("admin", Permission::DeleteUsers));
        assert!(!has_permission_named("user", Permission::DeleteUsers));
    }

    #[test]
    fn test_wire_names_parse_back() {
        for permission in Permission::ALL {
            assert_eq!(permission.as_str().parse::<Permission>().unwrap(), permission);
        }
        assert!("read:everything".parse::<Permission>().is_err());
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_permission_serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&Permission::ReadAllTasks).unwrap(),
            "\"read:all_tasks\""
        );
    }

    #[test]
    fn test_admin_outranks_user() {
        assert!(Role::Admin.privilege() > Role::User.privilege());
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_permission() -> impl Strategy<Value = Permission> {
        prop::sample::select(Permission::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_checker_is_set_membership(role in any_role(), permission in any_permission()) {
            let first = has_permission(role, permission);
            prop_assert_eq!(first, has_permission(role, permission));
            prop_assert_eq!(first, role.permissions().iter().any(|p| *p == permission));
            prop_assert_eq!(first, has_permission_named(role.as_str(), permission));
        }

        #[test]
        fn prop_unknown_role_names_hold_nothing(
            name in "[a-z]{1,12}",
            permission in any_permission(),
        ) {
            prop_assume!(name != "user" && name != "admin");
            prop_assert!(!has_permission_named(&name, permission));
        }
    }
}
