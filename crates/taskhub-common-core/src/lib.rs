//! Shared core types for taskhub.

pub mod id;

pub use id::{IdParseError, TaskId, UserId};
