//! Email directory entity definitions.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Returns true if `address` is syntactically valid.
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_PATTERN.is_match(address)
}

/// An entry in the shared email directory.
///
/// Addresses are stored lowercase and are globally unique across the
/// directory, case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// Lowercase email address.
    pub address: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl EmailEntry {
    /// Creates a new directory entry, lowercasing the address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            address: address.into().to_lowercase(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_lowercases_address() {
        let entry = EmailEntry::new("Alice@Example.COM");
        assert_eq!(entry.address, "alice@example.com");
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address("alice@example.com"));
        assert!(is_valid_address("a.b+c@sub.domain.org"));

        assert!(!is_valid_address("alice"));
        assert!(!is_valid_address("alice@example"));
        assert!(!is_valid_address("alice @example.com"));
        assert!(!is_valid_address("@example.com"));
        assert!(!is_valid_address(""));
    }
}
