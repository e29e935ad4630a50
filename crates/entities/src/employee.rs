//! Employee entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked individual with zero or more tasks and associated emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Lowercase form of the name, used for uniqueness checks.
    pub name_lower: String,
    /// Email addresses assigned to this employee, in insertion order.
    pub emails: Vec<String>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Creates a new employee.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name_lower = name.to_lowercase();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            name_lower,
            emails: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the email list.
    pub fn with_emails(mut self, emails: Vec<String>) -> Self {
        self.emails = emails;
        self
    }

    /// Renames the employee, keeping `name_lower` in sync.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.name_lower = self.name.to_lowercase();
        self.updated_at = Utc::now();
    }

    /// Returns true if `candidate` matches this employee's name
    /// case-insensitively.
    pub fn matches_name(&self, candidate: &str) -> bool {
        self.name_lower == candidate.trim().to_lowercase()
    }
}
