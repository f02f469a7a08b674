//! Resource ownership and self-action rules.

use crate::{
    error::{AuthError, AuthResult},
    permission::{has_permission, Permission, Role},
};
use taskhub_common_core::UserId;

/// A resource that belongs to exactly one identity.
pub trait Owned {
    /// Human-readable resource name used in rejections.
    const KIND: &'static str;

    /// The owning identity.
    fn owner_id(&self) -> UserId;
}

/// Operations scoped to a single resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedAction {
    /// Read one resource.
    Read,
    /// Modify one resource.
    Update,
    /// Remove one resource.
    Delete,
}

impl ScopedAction {
    /// Permission that covers the caller's own resources.
    pub fn own_permission(self) -> Permission {
        match self {
            Self::Read => Permission::ReadOwnTasks,
            Self::Update => Permission::UpdateOwnTasks,
            Self::Delete => Permission::DeleteOwnTasks,
        }
    }

    /// Permission that covers every resource regardless of owner.
    pub fn all_permission(self) -> Permission {
        match self {
            Self::Read => Permission::ReadAllTasks,
            Self::Update => Permission::UpdateAllTasks,
            Self::Delete => Permission::DeleteAllTasks,
        }
    }

    /// Whether `role` may perform this action on anyone's resource.
    pub fn is_unrestricted_for(self, role: Role) -> bool {
        has_permission(role, self.all_permission())
    }
}

/// Decide whether `actor` may perform `action` on a resource owned by `owner`.
pub fn authorize_owned(
    role: Role,
    actor: UserId,
    action: ScopedAction,
    owner: UserId,
    kind: &'static str,
) -> AuthResult<()> {
    if action.is_unrestricted_for(role) {
        return Ok(());
    }
    if !has_permission(role, action.own_permission()) {
        return Err(AuthError::InsufficientPermissions);
    }
    if owner != actor {
        return Err(AuthError::AccessDenied(kind));
    }
    Ok(())
}

/// Ownership check over an already loaded (or missing) resource.
///
/// Holders of the all-resources permission pass without looking at the
/// resource at all. Everyone else needs the resource to exist and be theirs.
pub fn check_ownership<R: Owned>(
    role: Role,
    actor: UserId,
    action: ScopedAction,
    resource: Option<&R>,
) -> AuthResult<()> {
    if action.is_unrestricted_for(role) {
        return Ok(());
    }
    let resource = resource.ok_or(AuthError::ResourceNotFound(R::KIND))?;
    authorize_owned(role, actor, action, resource.owner_id(), R::KIND)
}

/// Identity-management actions an actor may never aim at themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfAction {
    /// Delete the account.
    Delete,
    /// Flip the active flag.
    ChangeStatus,
    /// Move to a lower-privilege role.
    Demote,
}

impl SelfAction {
    /// Rejection message shown to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Delete => "You cannot delete yourself",
            Self::ChangeStatus => "You cannot change your own status",
            Self::Demote => "You cannot demote yourself",
        }
    }
}

/// Reject `action` when the target is the actor.
pub fn ensure_not_self(actor: UserId, target: UserId, action: SelfAction) -> AuthResult<()> {
    if actor == target {
        Err(AuthError::SelfActionForbidden(action))
    } else {
        Ok(())
    }
}

/// Reject a role change that would lower the actor's own privilege.
pub fn ensure_role_change_allowed(
    actor: UserId,
    target: UserId,
    current: Role,
    requested: Role,
) -> AuthResult<()> {
    if requested.privilege() < current.privilege() {
        ensure_not_self(actor, target, SelfAction::Demote)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note {
        owner: UserId,
    }

    impl Owned for Note {
        const KIND: &'static str = "Note";

        fn owner_id(&self) -> UserId {
            self.owner
        }
    }

    const ACTIONS: [ScopedAction; 3] = [ScopedAction::Read, ScopedAction::Update, ScopedAction::Delete];

    #[test]
    fn test_user_is_denied_on_foreign_resource() {
        let a = UserId::new();
        let note = Note { owner: UserId::new() };
        for action in ACTIONS {
            assert_eq!(
                check_ownership(Role::User, a, action, Some(&note)),
                Err(AuthError::AccessDenied("Note"))
            );
        }
    }

    #[test]
    fn test_user_passes_on_own_resource() {
        let a = UserId::new();
        let note = Note { owner: a };
        for action in ACTIONS {
            assert_eq!(check_ownership(Role::User, a, action, Some(&note)), Ok(()));
        }
    }

    #[test]
    fn test_admin_passes_on_foreign_resource() {
        let note = Note { owner: UserId::new() };
        for action in ACTIONS {
            assert_eq!(check_ownership(Role::Admin, UserId::new(), action, Some(&note)), Ok(()));
        }
    }

    #[test]
    fn test_admin_passes_without_loading() {
        assert_eq!(
            check_ownership::<Note>(Role::Admin, UserId::new(), ScopedAction::Delete, None),
            Ok(())
        );
    }

    #[test]
    fn test_missing_resource_is_not_found_for_user() {
        assert_eq!(
            check_ownership::<Note>(Role::User, UserId::new(), ScopedAction::Read, None),
            Err(AuthError::ResourceNotFound("Note"))
        );
    }

    #[test]
    fn test_self_actions_are_rejected_even_for_admin() {
        let x = UserId::new();
        assert_eq!(
            ensure_not_self(x, x, SelfAction::Delete),
            Err(AuthError::SelfActionForbidden(SelfAction::Delete))
        );
        assert_eq!(
            ensure_not_self(x, x, SelfAction::ChangeStatus),
            Err(AuthError::SelfActionForbidden(SelfAction::ChangeStatus))
        );
        assert_eq!(
            ensure_role_change_allowed(x, x, Role::Admin, Role::User),
            Err(AuthError::SelfActionForbidden(SelfAction::Demote))
        );
    }

    #[test]
    fn test_actions_on_others_are_allowed() {
        let (x, y) = (UserId::new(), UserId::new());
        assert_eq!(ensure_not_self(x, y, SelfAction::Delete), Ok(()));
        assert_eq!(ensure_role_change_allowed(x, y, Role::Admin, Role::User), Ok(()));
    }

    #[test]
    fn test_non_demoting_self_role_change_is_allowed() {
        let x = UserId::new();
        assert_eq!(ensure_role_change_allowed(x, x, Role::Admin, Role::Admin), Ok(()));
        assert_eq!(ensure_role_change_allowed(x, x, Role::User, Role::Admin), Ok(()));
    }

    #[test]
    fn test_self_action_messages() {
        assert_eq!(
            AuthError::SelfActionForbidden(SelfAction::Demote).to_string(),
            "You cannot demote yourself"
        );
    }
}
