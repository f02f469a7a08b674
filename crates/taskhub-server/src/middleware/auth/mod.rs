//! Authentication middleware for the taskhub API server.

pub mod extractor;
pub mod layer;
pub mod types;

pub use extractor::Auth;
pub use layer::{authenticate, extract_bearer, AuthLayer, AuthMiddleware};
pub use types::AuthUser;
