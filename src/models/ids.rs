//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time. Entities created locally get random UUIDs;
//! entities whose identity comes from an external collaborator (transactions,
//! bank accounts, categories) carry opaque string IDs that must stay stable
//! across re-sync.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate UUID-backed ID newtype wrappers
macro_rules! define_uuid_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }
    };
}

/// Macro to generate string-backed ID newtype wrappers
///
/// These IDs are provider- or user-assigned and are used for de-duplication,
/// so they are preserved verbatim instead of being re-minted as UUIDs.
macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mint a fresh random identifier
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_uuid_id!(ShardId, "shd-");
define_uuid_id!(RuleId, "rul-");
define_uuid_id!(MemberId, "mem-");

define_string_id!(TransactionId);
define_string_id!(AccountId);

/// Category identifier: a human-readable slug such as `groceries`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Wrap an existing category slug
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The sentinel category for transactions no tier has classified yet
    pub fn uncategorized() -> Self {
        Self("uncategorized".to_string())
    }

    /// Derive a slug from a display name ("Pet Care" -> "pet-care")
    pub fn from_name(name: &str) -> Self {
        let slug = name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        Self(slug)
    }

    /// Get the slug as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this is the uncategorized sentinel
    pub fn is_uncategorized(&self) -> bool {
        self.0 == "uncategorized"
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_unique() {
        assert_ne!(RuleId::new(), RuleId::new());
        assert_ne!(ShardId::new(), ShardId::new());
    }

    #[test]
    fn test_string_id_roundtrip() {
        let id = TransactionId::new("acct-1-2026-01-05-3");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"acct-1-2026-01-05-3\"");
        let back: TransactionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_category_slug_from_name() {
        assert_eq!(CategoryId::from_name("Pet  Care").as_str(), "pet-care");
        assert!(CategoryId::uncategorized().is_uncategorized());
        assert!(!CategoryId::new("dining").is_uncategorized());
    }

    #[test]
    fn test_uuid_id_display_prefix() {
        let id = RuleId::new();
        assert!(id.to_string().starts_with("rul-"));
    }
}
