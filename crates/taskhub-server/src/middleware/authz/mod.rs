//! Authorization middleware: route-level permission gates and resource
//! ownership enforcement.

pub mod audit;
pub mod layer;
pub mod ownership;

pub use audit::{log_authz, AuthzAuditEvent};
pub use layer::{check_requirement, AuthzLayer, AuthzMiddleware, Requirement};
pub use ownership::{load_owned_task, task_scope};
