//! Document store trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{EmailEntry, Employee, Task};
use uuid::Uuid;

use crate::DocStoreResult;

/// Trait for document storage operations.
///
/// Collections are ordered by arrival: list operations return documents in
/// `created_at` order. Mutations are sequential request/response calls with
/// no transactions across documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // =========================================================================
    // Employee operations
    // =========================================================================

    /// Creates a new employee document.
    async fn create_employee(&self, employee: &Employee) -> DocStoreResult<()>;

    /// Gets an employee by ID.
    async fn get_employee(&self, id: Uuid) -> DocStoreResult<Option<Employee>>;

    /// Lists all employees.
    async fn list_employees(&self) -> DocStoreResult<Vec<Employee>>;

    /// Renames an employee, refreshing the normalized name.
    async fn rename_employee(&self, id: Uuid, name: &str) -> DocStoreResult<()>;

    /// Replaces an employee's email list.
    async fn replace_employee_emails(&self, id: Uuid, emails: &[String]) -> DocStoreResult<()>;

    /// Deletes an employee document.
    ///
    /// Does not touch the employee's tasks; the caller owns the cascade.
    async fn delete_employee(&self, id: Uuid) -> DocStoreResult<()>;

    // =========================================================================
    // Task operations (scoped under their owning employee)
    // =========================================================================

    /// Creates a new task document.
    async fn create_task(&self, task: &Task) -> DocStoreResult<()>;

    /// Gets a task by ID.
    async fn get_task(&self, id: Uuid) -> DocStoreResult<Option<Task>>;

    /// Lists the tasks owned by an employee.
    async fn list_tasks(&self, employee_id: Uuid) -> DocStoreResult<Vec<Task>>;

    /// Marks a task completed at the given instant.
    async fn complete_task(
        &self,
        id: Uuid,
        late: bool,
        completed_at: DateTime<Utc>,
    ) -> DocStoreResult<()>;

    /// Deletes a task document.
    async fn delete_task(&self, id: Uuid) -> DocStoreResult<()>;

    // =========================================================================
    // Email directory operations
    // =========================================================================

    /// Creates a new email directory entry.
    async fn create_email(&self, entry: &EmailEntry) -> DocStoreResult<()>;

    /// Lists all email directory entries.
    async fn list_emails(&self) -> DocStoreResult<Vec<EmailEntry>>;

    /// Updates an entry's address.
    async fn update_email_address(&self, id: Uuid, address: &str) -> DocStoreResult<()>;

    /// Deletes an email directory entry.
    async fn delete_email(&self, id: Uuid) -> DocStoreResult<()>;
}
