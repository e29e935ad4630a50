//! Dashboard session state and operations.

use std::sync::Arc;

use admin_gate::{AdminGate, Prompter};
use chrono::{NaiveDate, Utc};
use doc_store::{DocStoreError, DocumentStore, TaskCache};
use entities::{
    is_valid_address, progress_percent, DateRange, EmailEntry, Employee, StatusBuckets, Task,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DashboardError, DashboardResult};

/// One operator's view of the dashboard.
///
/// Holds the loaded employee roster, the selected employee's tasks, the
/// email directory and the active date filter. Every mutating operation
/// goes through the admin gate; reads never do.
pub struct DashboardSession<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
    prompter: Arc<dyn Prompter>,
    gate: AdminGate,
    employees: Vec<Employee>,
    selected: Option<Uuid>,
    tasks: Vec<Task>,
    range: DateRange,
    directory: Vec<EmailEntry>,
    selected_email: Option<String>,
    email_picker_open: bool,
}

impl<S, C> DashboardSession<S, C>
where
    S: DocumentStore,
    C: TaskCache,
{
    pub fn new(store: Arc<S>, cache: Arc<C>, prompter: Arc<dyn Prompter>, gate: AdminGate) -> Self {
        Self {
            store,
            cache,
            prompter,
            gate,
            employees: Vec::new(),
            selected: None,
            tasks: Vec::new(),
            range: DateRange::new(),
            directory: Vec::new(),
            selected_email: None,
            email_picker_open: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn selected(&self) -> Option<&Employee> {
        let id = self.selected?;
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn directory(&self) -> &[EmailEntry] {
        &self.directory
    }

    pub fn selected_email(&self) -> Option<&str> {
        self.selected_email.as_deref()
    }

    pub fn email_picker_open(&self) -> bool {
        self.email_picker_open
    }

    pub fn date_range(&self) -> DateRange {
        self.range
    }

    pub fn gate(&self) -> &AdminGate {
        &self.gate
    }

    // =========================================================================
    // Admin gate
    // =========================================================================

    /// Unlocks a locked admin session or locks an unlocked one.
    pub async fn toggle_admin(&mut self) -> bool {
        self.gate.toggle(self.prompter.as_ref()).await
    }

    async fn authorize(&self) -> DashboardResult<()> {
        if self.gate.authorize(self.prompter.as_ref()).await {
            Ok(())
        } else {
            Err(DashboardError::AuthorizationDenied)
        }
    }

    // =========================================================================
    // Loading and selection
    // =========================================================================

    /// Reloads the employee roster and the email directory from the store.
    ///
    /// When the previous selection is gone (or there was none) the first
    /// employee in the roster becomes the selection.
    pub async fn refresh(&mut self) -> DashboardResult<()> {
        self.employees = self.store.list_employees().await?;
        self.directory = self.store.list_emails().await?;
        debug!(
            employees = self.employees.len(),
            emails = self.directory.len(),
            "roster refreshed"
        );

        let still_valid = self
            .selected
            .is_some_and(|id| self.employees.iter().any(|e| e.id == id));
        if !still_valid {
            self.clear_selection();
            if let Some(first) = self.employees.first().map(|e| e.id) {
                self.select_employee(first).await?;
            }
        }
        Ok(())
    }

    /// Selects an employee and loads their tasks.
    ///
    /// The loaded snapshot replaces the previous one wholesale and is
    /// written through to the cache. If the store is unreachable the last
    /// cached snapshot is served instead; only when both fail does the
    /// selection error out.
    pub async fn select_employee(&mut self, id: Uuid) -> DashboardResult<()> {
        let employee = self
            .employees
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| DocStoreError::not_found("Employee", id.to_string()))?;

        let tasks = match self.store.list_tasks(id).await {
            Ok(tasks) => {
                self.write_cache(id, &tasks).await;
                tasks
            }
            Err(e) => {
                warn!(employee_id = %id, error = %e, "task load failed, trying cache");
                match self.cache.read_tasks(id).await? {
                    Some(tasks) => tasks,
                    None => return Err(e.into()),
                }
            }
        };

        info!(employee_id = %id, name = %employee.name, tasks = tasks.len(), "employee selected");
        self.selected = Some(id);
        self.tasks = tasks;
        self.selected_email = employee.emails.last().cloned();
        Ok(())
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.tasks.clear();
        self.selected_email = None;
    }

    /// Cache writes are best-effort; a failed write never fails the caller.
    async fn write_cache(&self, employee_id: Uuid, tasks: &[Task]) {
        if let Err(e) = self.cache.write_tasks(employee_id, tasks).await {
            warn!(employee_id = %employee_id, error = %e, "task cache write failed");
        }
    }

    // =========================================================================
    // Employees
    // =========================================================================

    /// Adds an employee and selects them.
    pub async fn add_employee(&mut self, name: &str) -> DashboardResult<Uuid> {
        self.authorize().await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::validation("Employee name must not be empty"));
        }
        if self.employees.iter().any(|e| e.matches_name(name)) {
            return Err(DashboardError::duplicate("Employee", name));
        }

        let employee = Employee::new(name);
        self.store
            .create_employee(&employee)
            .await
            .map_err(|e| conflict_as_duplicate(e, "Employee", name))?;

        info!(employee_id = %employee.id, name = %employee.name, "employee added");
        let id = employee.id;
        self.employees.push(employee);
        self.selected = Some(id);
        self.tasks.clear();
        self.selected_email = None;
        self.write_cache(id, &[]).await;
        Ok(id)
    }

    /// Renames an employee. Uniqueness is enforced by the store.
    pub async fn rename_employee(&mut self, id: Uuid, name: &str) -> DashboardResult<()> {
        self.authorize().await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::validation("Employee name must not be empty"));
        }

        self.store
            .rename_employee(id, name)
            .await
            .map_err(|e| conflict_as_duplicate(e, "Employee", name))?;

        if let Some(employee) = self.employees.iter_mut().find(|e| e.id == id) {
            employee.rename(name);
        }
        info!(employee_id = %id, name, "employee renamed");
        Ok(())
    }

    /// Deletes an employee and all their tasks, after confirmation.
    ///
    /// Tasks are deleted first so that an interrupted run leaves an
    /// employee with fewer tasks, never orphaned tasks. The whole
    /// operation is safe to retry.
    pub async fn delete_employee(&mut self, id: Uuid) -> DashboardResult<()> {
        self.authorize().await?;

        if !self
            .prompter
            .confirm("Delete employee?", "All of their tasks will be deleted too.")
            .await
        {
            debug!(employee_id = %id, "employee delete cancelled");
            return Ok(());
        }

        let tasks = self.store.list_tasks(id).await?;
        for task in &tasks {
            self.store.delete_task(task.id).await?;
        }
        self.store.delete_employee(id).await?;

        info!(employee_id = %id, tasks = tasks.len(), "employee deleted");
        self.employees.retain(|e| e.id != id);
        if self.selected == Some(id) {
            self.clear_selection();
        }
        Ok(())
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Assigns a task to the selected employee.
    ///
    /// The selected email, if any, is stamped onto the task.
    pub async fn assign_task(
        &mut self,
        name: &str,
        description: Option<&str>,
        due_date: NaiveDate,
    ) -> DashboardResult<Uuid> {
        self.authorize().await?;
        let employee_id = self.selected.ok_or(DashboardError::NoSelection)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::validation("Task name must not be empty"));
        }

        let mut task = Task::new(employee_id, name, due_date);
        if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
            task = task.with_description(description);
        }
        if let Some(email) = &self.selected_email {
            task = task.with_email(email.clone());
        }

        self.store.create_task(&task).await?;
        info!(task_id = %task.id, employee_id = %employee_id, name, "task assigned");
        let id = task.id;
        self.tasks.push(task);
        self.write_cache(employee_id, &self.tasks).await;
        Ok(id)
    }

    /// Marks a task of the selected employee as completed.
    pub async fn complete_task(&mut self, id: Uuid, late: bool) -> DashboardResult<()> {
        self.authorize().await?;
        let employee_id = self.selected.ok_or(DashboardError::NoSelection)?;

        let at = Utc::now();
        self.store.complete_task(id, late, at).await?;
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.mark_completed(late, at);
        }
        info!(task_id = %id, late, "task completed");
        self.write_cache(employee_id, &self.tasks).await;
        Ok(())
    }

    /// Deletes a task of the selected employee, after confirmation.
    pub async fn delete_task(&mut self, id: Uuid) -> DashboardResult<()> {
        self.authorize().await?;
        let employee_id = self.selected.ok_or(DashboardError::NoSelection)?;

        if !self
            .prompter
            .confirm("Delete task?", "This cannot be undone.")
            .await
        {
            debug!(task_id = %id, "task delete cancelled");
            return Ok(());
        }

        self.store.delete_task(id).await?;
        self.tasks.retain(|t| t.id != id);
        info!(task_id = %id, "task deleted");
        self.write_cache(employee_id, &self.tasks).await;
        Ok(())
    }

    // =========================================================================
    // Email directory
    // =========================================================================

    /// Adds an address to the shared email directory.
    pub async fn add_email(&mut self, address: &str) -> DashboardResult<Uuid> {
        self.authorize().await?;

        let address = address.trim();
        if !is_valid_address(address) {
            return Err(DashboardError::validation("Invalid email address"));
        }
        let entry = EmailEntry::new(address);
        if self.directory.iter().any(|e| e.address == entry.address) {
            return Err(DashboardError::duplicate("Email", entry.address));
        }

        self.store
            .create_email(&entry)
            .await
            .map_err(|e| conflict_as_duplicate(e, "Email", &entry.address))?;

        info!(email_id = %entry.id, address = %entry.address, "email added");
        let id = entry.id;
        self.directory.push(entry);
        Ok(id)
    }

    /// Changes a directory address. The selection follows the rename.
    pub async fn edit_email(&mut self, id: Uuid, address: &str) -> DashboardResult<()> {
        self.authorize().await?;

        let address = address.trim().to_lowercase();
        if !is_valid_address(&address) {
            return Err(DashboardError::validation("Invalid email address"));
        }
        if self
            .directory
            .iter()
            .any(|e| e.id != id && e.address == address)
        {
            return Err(DashboardError::duplicate("Email", address));
        }

        self.store
            .update_email_address(id, &address)
            .await
            .map_err(|e| conflict_as_duplicate(e, "Email", &address))?;

        if let Some(entry) = self.directory.iter_mut().find(|e| e.id == id) {
            if self.selected_email.as_deref() == Some(entry.address.as_str()) {
                self.selected_email = Some(address.clone());
            }
            entry.address = address.clone();
        }
        info!(email_id = %id, address = %address, "email updated");
        Ok(())
    }

    /// Removes a directory address, after confirmation.
    pub async fn delete_email(&mut self, id: Uuid) -> DashboardResult<()> {
        self.authorize().await?;

        if !self
            .prompter
            .confirm("Delete email?", "Tasks keep the addresses already stamped on them.")
            .await
        {
            debug!(email_id = %id, "email delete cancelled");
            return Ok(());
        }

        self.store.delete_email(id).await?;
        if let Some(entry) = self.directory.iter().find(|e| e.id == id) {
            if self.selected_email.as_deref() == Some(entry.address.as_str()) {
                self.selected_email = None;
            }
        }
        self.directory.retain(|e| e.id != id);
        info!(email_id = %id, "email deleted");
        Ok(())
    }

    /// Picks the address stamped onto newly assigned tasks.
    pub fn select_email(&mut self, address: Option<String>) {
        self.selected_email = address.map(|a| a.to_lowercase());
    }

    pub fn toggle_email_picker(&mut self) {
        self.email_picker_open = !self.email_picker_open;
    }

    /// Replaces the selected employee's personal email list.
    ///
    /// The last address becomes the selected one, matching how a freshly
    /// selected employee behaves.
    pub async fn replace_emails(&mut self, emails: Vec<String>) -> DashboardResult<()> {
        self.authorize().await?;
        let employee_id = self.selected.ok_or(DashboardError::NoSelection)?;

        let emails: Vec<String> = emails
            .into_iter()
            .map(|e| e.trim().to_lowercase())
            .collect();
        if let Some(bad) = emails.iter().find(|e| !is_valid_address(e)) {
            return Err(DashboardError::validation(format!(
                "Invalid email address: {bad}"
            )));
        }

        self.store
            .replace_employee_emails(employee_id, &emails)
            .await?;
        self.selected_email = emails.last().cloned();
        if let Some(employee) = self.employees.iter_mut().find(|e| e.id == employee_id) {
            employee.emails = emails;
        }
        info!(employee_id = %employee_id, "employee emails replaced");
        Ok(())
    }

    // =========================================================================
    // Filtering and metrics
    // =========================================================================

    pub fn set_date_range(&mut self, range: DateRange) {
        self.range = range;
    }

    pub fn clear_date_range(&mut self) {
        self.range = DateRange::new();
    }

    /// The selected employee's tasks within the active date range.
    ///
    /// The range narrows the task table only; the aggregates below always
    /// cover the full list.
    pub fn filtered_tasks(&self) -> Vec<Task> {
        self.range.apply(&self.tasks)
    }

    /// Mean task score over all of the selected employee's tasks, rounded.
    /// Zero when empty.
    pub fn progress_percent(&self) -> u8 {
        progress_percent(&self.tasks)
    }

    /// Chart buckets over all of the selected employee's tasks. The buckets
    /// always sum to the employee's total task count.
    pub fn status_buckets(&self) -> StatusBuckets {
        StatusBuckets::tally(&self.tasks)
    }
}

fn conflict_as_duplicate(
    e: DocStoreError,
    entity: &'static str,
    value: impl Into<String>,
) -> DashboardError {
    match e {
        DocStoreError::AlreadyExists { .. } => DashboardError::duplicate(entity, value),
        other => DashboardError::Store(other),
    }
}
