//! SQLite-backed document store implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use entities::{EmailEntry, Employee, Task};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use tracing::debug;
use uuid::Uuid;

use crate::{DocStoreError, DocStoreResult, DocumentStore};

/// SQLite document store.
///
/// Uniqueness of `employees.name_lower` and `emails.address` is enforced by
/// the schema, so a racing second session gets `AlreadyExists` instead of
/// corrupting the invariant.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: Pool<Sqlite>,
}

impl SqliteDocumentStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL and initializes the schema.
    ///
    /// A single connection keeps `sqlite::memory:` databases coherent
    /// across calls.
    pub async fn connect(url: &str) -> DocStoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        let store = Self::new(pool);
        store.init().await?;
        debug!(url, "sqlite store ready");
        Ok(store)
    }

    /// Initializes the database tables.
    pub async fn init(&self) -> DocStoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS employees (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                name_lower TEXT NOT NULL UNIQUE,
                emails TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                due_date TEXT NOT NULL,
                completed INTEGER NOT NULL,
                late INTEGER NOT NULL,
                email TEXT,
                completed_at TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_tasks_employee_id
            ON tasks (employee_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS emails (
                id TEXT PRIMARY KEY,
                address TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn parse_uuid(s: &str) -> DocStoreResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DocStoreError::Other(format!("Invalid UUID {s:?}: {e}")))
}

fn parse_timestamp(s: &str) -> DocStoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DocStoreError::Other(format!("Invalid timestamp {s:?}: {e}")))
}

fn parse_date(s: &str) -> DocStoreResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DocStoreError::Other(format!("Invalid date {s:?}: {e}")))
}

fn map_unique_violation(
    e: sqlx::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> DocStoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DocStoreError::already_exists(entity_type, id)
        }
        _ => DocStoreError::from(e),
    }
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    name: String,
    name_lower: String,
    emails: String,
    created_at: String,
    updated_at: String,
}

impl EmployeeRow {
    fn into_employee(self) -> DocStoreResult<Employee> {
        Ok(Employee {
            id: parse_uuid(&self.id)?,
            name: self.name,
            name_lower: self.name_lower,
            emails: serde_json::from_str(&self.emails)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    employee_id: String,
    name: String,
    description: Option<String>,
    due_date: String,
    completed: i64,
    late: i64,
    email: Option<String>,
    completed_at: Option<String>,
    created_at: String,
}

impl TaskRow {
    fn into_task(self) -> DocStoreResult<Task> {
        Ok(Task {
            id: parse_uuid(&self.id)?,
            employee_id: parse_uuid(&self.employee_id)?,
            name: self.name,
            description: self.description,
            due_date: parse_date(&self.due_date)?,
            completed: self.completed != 0,
            late: self.late != 0,
            email: self.email,
            completed_at: self
                .completed_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EmailRow {
    id: String,
    address: String,
    created_at: String,
}

impl EmailRow {
    fn into_entry(self) -> DocStoreResult<EmailEntry> {
        Ok(EmailEntry {
            id: parse_uuid(&self.id)?,
            address: self.address,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    // =========================================================================
    // Employee operations
    // =========================================================================

    async fn create_employee(&self, employee: &Employee) -> DocStoreResult<()> {
        sqlx::query(
            "INSERT INTO employees (id, name, name_lower, emails, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(employee.id.to_string())
        .bind(&employee.name)
        .bind(&employee.name_lower)
        .bind(serde_json::to_string(&employee.emails)?)
        .bind(employee.created_at.to_rfc3339())
        .bind(employee.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Employee", employee.name_lower.clone()))?;

        Ok(())
    }

    async fn get_employee(&self, id: Uuid) -> DocStoreResult<Option<Employee>> {
        let row: Option<EmployeeRow> = sqlx::query_as(
            "SELECT id, name, name_lower, emails, created_at, updated_at
             FROM employees
             WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(EmployeeRow::into_employee).transpose()
    }

    async fn list_employees(&self) -> DocStoreResult<Vec<Employee>> {
        let rows: Vec<EmployeeRow> = sqlx::query_as(
            "SELECT id, name, name_lower, emails, created_at, updated_at
             FROM employees
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EmployeeRow::into_employee).collect()
    }

    async fn rename_employee(&self, id: Uuid, name: &str) -> DocStoreResult<()> {
        let result = sqlx::query(
            "UPDATE employees SET name = ?, name_lower = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(name)
        .bind(name.to_lowercase())
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Employee", name.to_lowercase()))?;

        if result.rows_affected() == 0 {
            return Err(DocStoreError::not_found("Employee", id.to_string()));
        }
        Ok(())
    }

    async fn replace_employee_emails(&self, id: Uuid, emails: &[String]) -> DocStoreResult<()> {
        let result = sqlx::query(
            "UPDATE employees SET emails = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(serde_json::to_string(emails)?)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DocStoreError::not_found("Employee", id.to_string()));
        }
        Ok(())
    }

    async fn delete_employee(&self, id: Uuid) -> DocStoreResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DocStoreError::not_found("Employee", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: &Task) -> DocStoreResult<()> {
        sqlx::query(
            "INSERT INTO tasks (id, employee_id, name, description, due_date, completed, late, \
             email, completed_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.to_string())
        .bind(task.employee_id.to_string())
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.due_date.to_string())
        .bind(i64::from(task.completed))
        .bind(i64::from(task.late))
        .bind(&task.email)
        .bind(task.completed_at.map(|t| t.to_rfc3339()))
        .bind(task.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> DocStoreResult<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, employee_id, name, description, due_date, completed, late, email, \
             completed_at, created_at
             FROM tasks
             WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TaskRow::into_task).transpose()
    }

    async fn list_tasks(&self, employee_id: Uuid) -> DocStoreResult<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, employee_id, name, description, due_date, completed, late, email, \
             completed_at, created_at
             FROM tasks
             WHERE employee_id = ?
             ORDER BY created_at",
        )
        .bind(employee_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    async fn complete_task(
        &self,
        id: Uuid,
        late: bool,
        completed_at: DateTime<Utc>,
    ) -> DocStoreResult<()> {
        let result = sqlx::query(
            "UPDATE tasks SET completed = 1, late = ?, completed_at = ?
             WHERE id = ?",
        )
        .bind(i64::from(late))
        .bind(completed_at.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DocStoreError::not_found("Task", id.to_string()));
        }
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> DocStoreResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DocStoreError::not_found("Task", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Email directory operations
    // =========================================================================

    async fn create_email(&self, entry: &EmailEntry) -> DocStoreResult<()> {
        sqlx::query(
            "INSERT INTO emails (id, address, created_at)
             VALUES (?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(&entry.address)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Email", entry.address.clone()))?;

        Ok(())
    }

    async fn list_emails(&self) -> DocStoreResult<Vec<EmailEntry>> {
        let rows: Vec<EmailRow> = sqlx::query_as(
            "SELECT id, address, created_at
             FROM emails
             ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EmailRow::into_entry).collect()
    }

    async fn update_email_address(&self, id: Uuid, address: &str) -> DocStoreResult<()> {
        let address = address.to_lowercase();
        let result = sqlx::query("UPDATE emails SET address = ? WHERE id = ?")
            .bind(&address)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Email", address.clone()))?;

        if result.rows_affected() == 0 {
            return Err(DocStoreError::not_found("Email", id.to_string()));
        }
        Ok(())
    }

    async fn delete_email(&self, id: Uuid) -> DocStoreResult<()> {
        let result = sqlx::query("DELETE FROM emails WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DocStoreError::not_found("Email", id.to_string()));
        }
        Ok(())
    }
}
