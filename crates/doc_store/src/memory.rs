//! In-memory document store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{EmailEntry, Employee, Task};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{DocStoreError, DocStoreResult, DocumentStore};

/// In-memory document store for tests and single-process use.
///
/// Enforces the uniqueness constraints (employee `name_lower`, email
/// address) at the store, mirroring the SQLite schema.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    employees: RwLock<HashMap<Uuid, Employee>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
    emails: RwLock<HashMap<Uuid, EmailEntry>>,
}

impl MemoryDocumentStore {
    /// Creates a new in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    // =========================================================================
    // Employee operations
    // =========================================================================

    async fn create_employee(&self, employee: &Employee) -> DocStoreResult<()> {
        let mut employees = self.employees.write().await;
        if employees.contains_key(&employee.id) {
            return Err(DocStoreError::already_exists(
                "Employee",
                employee.id.to_string(),
            ));
        }
        if employees
            .values()
            .any(|e| e.name_lower == employee.name_lower)
        {
            return Err(DocStoreError::already_exists(
                "Employee",
                employee.name_lower.clone(),
            ));
        }
        employees.insert(employee.id, employee.clone());
        Ok(())
    }

    async fn get_employee(&self, id: Uuid) -> DocStoreResult<Option<Employee>> {
        let employees = self.employees.read().await;
        Ok(employees.get(&id).cloned())
    }

    async fn list_employees(&self) -> DocStoreResult<Vec<Employee>> {
        let employees = self.employees.read().await;
        let mut result: Vec<Employee> = employees.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn rename_employee(&self, id: Uuid, name: &str) -> DocStoreResult<()> {
        let mut employees = self.employees.write().await;
        let name_lower = name.to_lowercase();
        if employees
            .values()
            .any(|e| e.id != id && e.name_lower == name_lower)
        {
            return Err(DocStoreError::already_exists("Employee", name_lower));
        }
        let employee = employees
            .get_mut(&id)
            .ok_or_else(|| DocStoreError::not_found("Employee", id.to_string()))?;
        employee.rename(name);
        Ok(())
    }

    async fn replace_employee_emails(&self, id: Uuid, emails: &[String]) -> DocStoreResult<()> {
        let mut employees = self.employees.write().await;
        let employee = employees
            .get_mut(&id)
            .ok_or_else(|| DocStoreError::not_found("Employee", id.to_string()))?;
        employee.emails = emails.to_vec();
        employee.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_employee(&self, id: Uuid) -> DocStoreResult<()> {
        let mut employees = self.employees.write().await;
        if employees.remove(&id).is_none() {
            return Err(DocStoreError::not_found("Employee", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: &Task) -> DocStoreResult<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(DocStoreError::already_exists("Task", task.id.to_string()));
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> DocStoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, employee_id: Uuid) -> DocStoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut result: Vec<Task> = tasks
            .values()
            .filter(|t| t.employee_id == employee_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn complete_task(
        &self,
        id: Uuid,
        late: bool,
        completed_at: DateTime<Utc>,
    ) -> DocStoreResult<()> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| DocStoreError::not_found("Task", id.to_string()))?;
        task.mark_completed(late, completed_at);
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> DocStoreResult<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.remove(&id).is_none() {
            return Err(DocStoreError::not_found("Task", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Email directory operations
    // =========================================================================

    async fn create_email(&self, entry: &EmailEntry) -> DocStoreResult<()> {
        let mut emails = self.emails.write().await;
        if emails.contains_key(&entry.id) {
            return Err(DocStoreError::already_exists("Email", entry.id.to_string()));
        }
        if emails.values().any(|e| e.address == entry.address) {
            return Err(DocStoreError::already_exists(
                "Email",
                entry.address.clone(),
            ));
        }
        emails.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn list_emails(&self) -> DocStoreResult<Vec<EmailEntry>> {
        let emails = self.emails.read().await;
        let mut result: Vec<EmailEntry> = emails.values().cloned().collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn update_email_address(&self, id: Uuid, address: &str) -> DocStoreResult<()> {
        let mut emails = self.emails.write().await;
        let address = address.to_lowercase();
        if emails.values().any(|e| e.id != id && e.address == address) {
            return Err(DocStoreError::already_exists("Email", address));
        }
        let entry = emails
            .get_mut(&id)
            .ok_or_else(|| DocStoreError::not_found("Email", id.to_string()))?;
        entry.address = address;
        Ok(())
    }

    async fn delete_email(&self, id: Uuid) -> DocStoreResult<()> {
        let mut emails = self.emails.write().await;
        if emails.remove(&id).is_none() {
            return Err(DocStoreError::not_found("Email", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn due(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_employee_crud() {
        let store = MemoryDocumentStore::new();

        let employee = Employee::new("Alice");
        store.create_employee(&employee).await.unwrap();

        let fetched = store.get_employee(employee.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Alice");

        store.rename_employee(employee.id, "Alicia").await.unwrap();
        let renamed = store.get_employee(employee.id).await.unwrap().unwrap();
        assert_eq!(renamed.name, "Alicia");
        assert_eq!(renamed.name_lower, "alicia");

        store.delete_employee(employee.id).await.unwrap();
        assert!(store.get_employee(employee.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected_at_store() {
        let store = MemoryDocumentStore::new();

        store.create_employee(&Employee::new("Alice")).await.unwrap();
        let err = store
            .create_employee(&Employee::new("ALICE"))
            .await
            .unwrap_err();

        assert!(matches!(err, DocStoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_tasks_are_scoped_to_employee() {
        let store = MemoryDocumentStore::new();

        let alice = Employee::new("Alice");
        let bob = Employee::new("Bob");
        store.create_employee(&alice).await.unwrap();
        store.create_employee(&bob).await.unwrap();

        store
            .create_task(&Task::new(alice.id, "Report", due(2024, 1, 10)))
            .await
            .unwrap();
        store
            .create_task(&Task::new(bob.id, "Review", due(2024, 1, 12)))
            .await
            .unwrap();

        let tasks = store.list_tasks(alice.id).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Report");
    }

    #[tokio::test]
    async fn test_complete_task_records_instant() {
        let store = MemoryDocumentStore::new();

        let task = Task::new(Uuid::new_v4(), "Report", due(2024, 1, 10));
        store.create_task(&task).await.unwrap();

        let at = Utc::now();
        store.complete_task(task.id, true, at).await.unwrap();

        let updated = store.get_task(task.id).await.unwrap().unwrap();
        assert!(updated.completed);
        assert!(updated.late);
        assert_eq!(updated.completed_at, Some(at));
    }

    #[tokio::test]
    async fn test_email_uniqueness_excludes_self_on_update() {
        let store = MemoryDocumentStore::new();

        let first = EmailEntry::new("a@example.com");
        let second = EmailEntry::new("b@example.com");
        store.create_email(&first).await.unwrap();
        store.create_email(&second).await.unwrap();

        // Re-saving the same address on the same entry is fine.
        store
            .update_email_address(first.id, "A@example.com")
            .await
            .unwrap();

        // Colliding with another entry is not.
        let err = store
            .update_email_address(second.id, "a@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, DocStoreError::AlreadyExists { .. }));
    }
}
