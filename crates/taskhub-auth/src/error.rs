//! Authentication and authorization failures.

use crate::ownership::SelfAction;
use thiserror::Error;

/// Result type for authorization operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Every way an authentication or authorization decision can reject a caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No usable bearer credential was presented.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Login with an unknown email or a wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Signature, structure, issuer, audience or expiry check failed.
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// The identity exists but has been deactivated.
    #[error("User account is deactivated")]
    AccountDeactivated,

    /// The token refers to an identity the store no longer knows.
    #[error("User no longer exists")]
    IdentityNotFound,

    /// The caller's role lacks the required permission.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// The scoped resource does not exist.
    #[error("{0} not found")]
    ResourceNotFound(&'static str),

    /// The scoped resource belongs to someone else.
    #[error("Access denied: this {0} belongs to another user")]
    AccessDenied(&'static str),

    /// A destructive or privilege-reducing action targeted the caller.
    #[error("{}", .0.message())]
    SelfActionForbidden(SelfAction),

    /// A signing secret is missing. Fatal at startup.
    #[error("{0} is not configured")]
    ConfigurationMissing(&'static str),

    /// Access and refresh domains were configured with the same secret.
    #[error("JWT_SECRET and JWT_REFRESH_SECRET must differ")]
    SharedSigningSecret,

    /// Encoding a token failed on the server side.
    #[error("Token signing failed")]
    TokenSigning,

    /// Hashing or parsing a stored password hash failed.
    #[error("Password hashing failed")]
    PasswordHash,
}
