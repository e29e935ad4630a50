//! Dashboard error types.

use doc_store::DocStoreError;

/// Dashboard error type.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The admin gate refused the operation.
    #[error("Admin authorization denied")]
    AuthorizationDenied,

    /// Invalid user input.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A uniqueness rule was violated.
    #[error("{entity} already exists: {value}")]
    Duplicate { entity: &'static str, value: String },

    /// An operation needed a selected employee and none was selected.
    #[error("No employee selected")]
    NoSelection,

    /// Storage error.
    #[error("Store error: {0}")]
    Store(#[from] DocStoreError),
}

impl DashboardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn duplicate(entity: &'static str, value: impl Into<String>) -> Self {
        Self::Duplicate {
            entity,
            value: value.into(),
        }
    }
}

/// Result type for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;
