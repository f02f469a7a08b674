//! Strongly-typed identifiers.
//!
//! Ids serialize as bare UUIDs so they can travel inside JWT subjects and
//! JSON bodies, while `Display` carries a short prefix that makes log lines
//! easy to scan.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[doc = concat!("A unique identifier displayed with prefix '", $prefix, "_'.")]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from string (with or without prefix).
            pub fn parse(s: &str) -> Result<Self, IdParseError> {
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| IdParseError::InvalidFormat(stringify!($name)))
            }

            /// Get the inner UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

/// Error parsing an ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    /// The ID is not a UUID.
    #[error("invalid {0} format")]
    InvalidFormat(&'static str),
}

define_id!(UserId, "usr");
define_id!(TaskId, "tsk");

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display_has_prefix() {
        assert!(UserId::new().to_string().starts_with("usr_"));
        assert!(TaskId::new().to_string().starts_with("tsk_"));
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        let id = TaskId::new();
        assert_eq!(TaskId::parse(&id.to_string()).unwrap(), id);
        assert_eq!(TaskId::parse(&id.as_uuid().to_string()).unwrap(), id);
    }

    #[test]
    fn test_serializes_as_bare_uuid() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            UserId::parse("usr_not-a-uuid"),
            Err(IdParseError::InvalidFormat("UserId"))
        );
    }

    #[test]
    fn test_foreign_prefix_is_rejected() {
        let id = TaskId::new();
        assert!(UserId::parse(&id.to_string()).is_err());
    }

    proptest! {
        #[test]
        fn prop_parse_inverts_display(bytes in any::<[u8; 16]>()) {
            let id = UserId::from_uuid(Uuid::from_bytes(bytes));
            prop_assert_eq!(UserId::parse(&id.to_string()).unwrap(), id);
        }
    }
}
