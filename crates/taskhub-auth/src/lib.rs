//! Authorization core for taskhub.
//!
//! This crate holds everything that decides *whether* a caller may do
//! something, independent of HTTP and storage:
//!
//! - [`permission`]: the closed role → permission table and the checker
//! - [`token`]: issuance and verification of access and refresh tokens
//! - [`ownership`]: resource ownership and self-action rules
//! - [`password`]: argon2 password hashing
//!
//! The server crate wires these into tower layers and handlers.

#![warn(missing_docs)]

pub mod error;
pub mod ownership;
pub mod password;
pub mod permission;
pub mod secret;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use ownership::{
    authorize_owned, check_ownership, ensure_not_self, ensure_role_change_allowed, Owned,
    ScopedAction, SelfAction,
};
pub use password::{hash_password, verify_password};
pub use permission::{has_permission, has_permission_named, Permission, Role, UnknownName};
pub use secret::{Secret, SecretString};
pub use token::{
    AccessClaims, RefreshClaims, TokenConfig, TokenKind, TokenPair, TokenService,
    TokenSubject, DEFAULT_AUDIENCE, DEFAULT_ISSUER,
};
