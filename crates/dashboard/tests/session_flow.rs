//! End-to-end session flows over the in-memory store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use admin_gate::{AdminGate, NoticeKind, Prompter};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use dashboard::{DashboardError, DashboardSession};
use doc_store::{
    DocStoreError, DocStoreResult, DocumentStore, MemoryDocumentStore, MemoryTaskCache,
};
use entities::{DateRange, EmailEntry, Employee, Task};
use uuid::Uuid;

const PIN: &str = "1234";

/// Prompter that always answers the PIN and approves confirmations.
struct AutoPrompter {
    confirm_answer: Mutex<bool>,
}

impl AutoPrompter {
    fn new() -> Self {
        Self {
            confirm_answer: Mutex::new(true),
        }
    }

    fn set_confirm(&self, answer: bool) {
        *self.confirm_answer.lock().unwrap() = answer;
    }
}

#[async_trait]
impl Prompter for AutoPrompter {
    async fn prompt_secret(&self, _title: &str) -> Option<String> {
        Some(PIN.to_string())
    }

    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        *self.confirm_answer.lock().unwrap()
    }

    async fn notify(&self, _kind: NoticeKind, _message: &str) {}
}

struct Fixture {
    store: Arc<MemoryDocumentStore>,
    prompter: Arc<AutoPrompter>,
    session: DashboardSession<MemoryDocumentStore, MemoryTaskCache>,
}

async fn unlocked_session() -> Fixture {
    let store = Arc::new(MemoryDocumentStore::new());
    let cache = Arc::new(MemoryTaskCache::new());
    let prompter = Arc::new(AutoPrompter::new());
    let mut session = DashboardSession::new(
        store.clone(),
        cache,
        prompter.clone(),
        AdminGate::new(PIN),
    );
    assert!(session.toggle_admin().await);
    session.refresh().await.unwrap();
    Fixture {
        store,
        prompter,
        session,
    }
}

fn due(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Store wrapper that can be told to fail specific operations.
struct FlakyStore {
    inner: MemoryDocumentStore,
    fail_list_tasks: AtomicBool,
    fail_delete_task: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            fail_list_tasks: AtomicBool::new(false),
            fail_delete_task: AtomicBool::new(false),
        }
    }

    fn fail_list_tasks(&self, on: bool) {
        self.fail_list_tasks.store(on, Ordering::SeqCst);
    }

    fn fail_delete_task(&self, on: bool) {
        self.fail_delete_task.store(on, Ordering::SeqCst);
    }

    fn offline() -> DocStoreError {
        DocStoreError::Other("store offline".to_string())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn create_employee(&self, employee: &Employee) -> DocStoreResult<()> {
        self.inner.create_employee(employee).await
    }

    async fn get_employee(&self, id: Uuid) -> DocStoreResult<Option<Employee>> {
        self.inner.get_employee(id).await
    }

    async fn list_employees(&self) -> DocStoreResult<Vec<Employee>> {
        self.inner.list_employees().await
    }

    async fn rename_employee(&self, id: Uuid, name: &str) -> DocStoreResult<()> {
        self.inner.rename_employee(id, name).await
    }

    async fn replace_employee_emails(&self, id: Uuid, emails: &[String]) -> DocStoreResult<()> {
        self.inner.replace_employee_emails(id, emails).await
    }

    async fn delete_employee(&self, id: Uuid) -> DocStoreResult<()> {
        self.inner.delete_employee(id).await
    }

    async fn create_task(&self, task: &Task) -> DocStoreResult<()> {
        self.inner.create_task(task).await
    }

    async fn get_task(&self, id: Uuid) -> DocStoreResult<Option<Task>> {
        self.inner.get_task(id).await
    }

    async fn list_tasks(&self, employee_id: Uuid) -> DocStoreResult<Vec<Task>> {
        if self.fail_list_tasks.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        self.inner.list_tasks(employee_id).await
    }

    async fn complete_task(
        &self,
        id: Uuid,
        late: bool,
        completed_at: DateTime<Utc>,
    ) -> DocStoreResult<()> {
        self.inner.complete_task(id, late, completed_at).await
    }

    async fn delete_task(&self, id: Uuid) -> DocStoreResult<()> {
        if self.fail_delete_task.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        self.inner.delete_task(id).await
    }

    async fn create_email(&self, entry: &EmailEntry) -> DocStoreResult<()> {
        self.inner.create_email(entry).await
    }

    async fn list_emails(&self) -> DocStoreResult<Vec<EmailEntry>> {
        self.inner.list_emails().await
    }

    async fn update_email_address(&self, id: Uuid, address: &str) -> DocStoreResult<()> {
        self.inner.update_email_address(id, address).await
    }

    async fn delete_email(&self, id: Uuid) -> DocStoreResult<()> {
        self.inner.delete_email(id).await
    }
}

async fn flaky_session() -> (Arc<FlakyStore>, DashboardSession<FlakyStore, MemoryTaskCache>) {
    let store = Arc::new(FlakyStore::new());
    let cache = Arc::new(MemoryTaskCache::new());
    let prompter = Arc::new(AutoPrompter::new());
    let mut session =
        DashboardSession::new(store.clone(), cache, prompter, AdminGate::new(PIN));
    assert!(session.toggle_admin().await);
    session.refresh().await.unwrap();
    (store, session)
}

#[tokio::test]
async fn locked_session_rejects_mutations() {
    let store = Arc::new(MemoryDocumentStore::new());
    let cache = Arc::new(MemoryTaskCache::new());
    // Session mode consults the gate state without prompting.
    let prompter = Arc::new(AutoPrompter::new());
    let mut session = DashboardSession::new(store, cache, prompter, AdminGate::new(PIN));

    let err = session.add_employee("Alice").await.unwrap_err();
    assert!(matches!(err, DashboardError::AuthorizationDenied));
    assert!(session.employees().is_empty());
}

#[tokio::test]
async fn employee_lifecycle_and_progress() {
    let mut fx = unlocked_session().await;

    let alice = fx.session.add_employee("  Alice  ").await.unwrap();
    assert_eq!(fx.session.selected().unwrap().name, "Alice");

    // Call-time duplicate check is case-insensitive.
    let err = fx.session.add_employee("alice").await.unwrap_err();
    assert!(matches!(err, DashboardError::Duplicate { .. }));

    let today = Utc::now().date_naive();
    let on_time = fx
        .session
        .assign_task("Report", Some("Quarterly numbers"), today + Duration::days(3))
        .await
        .unwrap();
    fx.session
        .assign_task("Review", None, today + Duration::days(5))
        .await
        .unwrap();

    // One task completed on time, one still pending: scores 100 and 0.
    fx.session.complete_task(on_time, false).await.unwrap();
    assert_eq!(fx.session.progress_percent(), 50);

    let buckets = fx.session.status_buckets();
    assert_eq!(buckets.completed_on_time, 1);
    assert_eq!(buckets.completed_late, 0);
    assert_eq!(buckets.outstanding, 1);

    fx.session.rename_employee(alice, "Alicia").await.unwrap();
    assert_eq!(fx.session.selected().unwrap().name, "Alicia");
    assert_eq!(fx.store.get_employee(alice).await.unwrap().unwrap().name, "Alicia");
}

#[tokio::test]
async fn cascade_delete_removes_tasks_first() {
    let mut fx = unlocked_session().await;

    let alice = fx.session.add_employee("Alice").await.unwrap();
    fx.session
        .assign_task("Report", None, due(2030, 1, 10))
        .await
        .unwrap();
    fx.session
        .assign_task("Review", None, due(2030, 1, 15))
        .await
        .unwrap();

    fx.session.delete_employee(alice).await.unwrap();

    assert!(fx.session.selected().is_none());
    assert!(fx.session.employees().is_empty());
    assert!(fx.store.get_employee(alice).await.unwrap().is_none());
    assert!(fx.store.list_tasks(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn declined_confirmation_is_a_no_op() {
    let mut fx = unlocked_session().await;

    let alice = fx.session.add_employee("Alice").await.unwrap();
    fx.prompter.set_confirm(false);

    fx.session.delete_employee(alice).await.unwrap();
    assert_eq!(fx.session.employees().len(), 1);
    assert!(fx.store.get_employee(alice).await.unwrap().is_some());
}

#[tokio::test]
async fn date_range_narrows_table_but_not_metrics() {
    let mut fx = unlocked_session().await;

    fx.session.add_employee("Alice").await.unwrap();
    let in_range = fx
        .session
        .assign_task("January", None, due(2030, 1, 10))
        .await
        .unwrap();
    fx.session
        .assign_task("March", None, due(2030, 3, 10))
        .await
        .unwrap();
    fx.session.complete_task(in_range, false).await.unwrap();

    fx.session.set_date_range(
        DateRange::new()
            .with_from(due(2030, 1, 1))
            .with_to(due(2030, 1, 31)),
    );
    assert_eq!(fx.session.filtered_tasks().len(), 1);

    // Aggregates cover the full task list even while a range is active:
    // mean of (100, 0) and buckets summing to the employee's total.
    assert_eq!(fx.session.progress_percent(), 50);
    assert_eq!(fx.session.status_buckets().total(), 2);

    fx.session.clear_date_range();
    assert_eq!(fx.session.filtered_tasks().len(), 2);
    assert_eq!(fx.session.progress_percent(), 50);
}

#[tokio::test]
async fn email_directory_flow() {
    let mut fx = unlocked_session().await;
    fx.session.add_employee("Alice").await.unwrap();

    let team = fx.session.add_email("Team@Example.com").await.unwrap();
    assert_eq!(fx.session.directory()[0].address, "team@example.com");

    let err = fx.session.add_email("team@example.com").await.unwrap_err();
    assert!(matches!(err, DashboardError::Duplicate { .. }));

    let err = fx.session.add_email("not-an-email").await.unwrap_err();
    assert!(matches!(err, DashboardError::Validation(_)));

    // Selecting an address stamps it onto newly assigned tasks.
    fx.session.select_email(Some("team@example.com".to_string()));
    fx.session
        .assign_task("Report", None, due(2030, 1, 10))
        .await
        .unwrap();
    assert_eq!(
        fx.session.filtered_tasks()[0].email.as_deref(),
        Some("team@example.com")
    );

    // Editing the selected address follows the selection.
    fx.session
        .edit_email(team, "Lead@Example.com")
        .await
        .unwrap();
    assert_eq!(fx.session.selected_email(), Some("lead@example.com"));

    // Deleting the selected address clears the selection.
    fx.session.delete_email(team).await.unwrap();
    assert!(fx.session.selected_email().is_none());
    assert!(fx.session.directory().is_empty());
}

#[tokio::test]
async fn replace_emails_selects_last() {
    let mut fx = unlocked_session().await;
    fx.session.add_employee("Alice").await.unwrap();

    fx.session
        .replace_emails(vec![
            "first@example.com".to_string(),
            "Second@Example.com".to_string(),
        ])
        .await
        .unwrap();

    assert_eq!(fx.session.selected_email(), Some("second@example.com"));
    assert_eq!(fx.session.selected().unwrap().emails.len(), 2);

    let err = fx
        .session
        .replace_emails(vec!["nope".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Validation(_)));
}

#[tokio::test]
async fn select_serves_cached_tasks_when_store_fails() {
    let (store, mut session) = flaky_session().await;

    let alice = session.add_employee("Alice").await.unwrap();
    session
        .assign_task("Report", None, due(2030, 1, 10))
        .await
        .unwrap();

    // The store goes away; the write-through snapshot still answers.
    store.fail_list_tasks(true);
    session.select_employee(alice).await.unwrap();
    assert_eq!(session.filtered_tasks().len(), 1);
    assert_eq!(session.filtered_tasks()[0].name, "Report");

    // With no snapshot for this employee the failure surfaces.
    let bob = Employee::new("Bob");
    store.create_employee(&bob).await.unwrap();
    store.fail_list_tasks(false);
    session.refresh().await.unwrap();
    store.fail_list_tasks(true);
    let err = session.select_employee(bob.id).await.unwrap_err();
    assert!(matches!(err, DashboardError::Store(_)));
    // The previous selection is untouched.
    assert_eq!(session.selected().unwrap().id, alice);
}

#[tokio::test]
async fn cascade_abort_keeps_employee_and_is_retryable() {
    let (store, mut session) = flaky_session().await;

    let alice = session.add_employee("Alice").await.unwrap();
    session
        .assign_task("Report", None, due(2030, 1, 10))
        .await
        .unwrap();
    session
        .assign_task("Review", None, due(2030, 1, 15))
        .await
        .unwrap();

    store.fail_delete_task(true);
    let err = session.delete_employee(alice).await.unwrap_err();
    assert!(matches!(err, DashboardError::Store(_)));

    // The employee record survives the aborted cascade.
    assert!(store.get_employee(alice).await.unwrap().is_some());
    assert_eq!(session.employees().len(), 1);
    assert_eq!(session.selected().unwrap().id, alice);

    // Retrying finishes the remaining steps.
    store.fail_delete_task(false);
    session.delete_employee(alice).await.unwrap();
    assert!(store.get_employee(alice).await.unwrap().is_none());
    assert!(store.list_tasks(alice).await.unwrap().is_empty());
    assert!(session.employees().is_empty());
}
