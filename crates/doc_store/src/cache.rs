//! Per-employee task snapshot cache.
//!
//! Snapshots are keyed by `"tasks_" + employee id` and stored as serialized
//! JSON, so any string-keyed key/value backend can implement the trait. The
//! cache is best-effort: readers fall back to it when the store is
//! unreachable, and writers overwrite the key wholesale on every refresh.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use entities::Task;
use uuid::Uuid;

use crate::{DocStoreError, DocStoreResult};

/// Cache key for an employee's task snapshot.
pub fn cache_key(employee_id: Uuid) -> String {
    format!("tasks_{employee_id}")
}

/// Trait for task snapshot caching.
#[async_trait]
pub trait TaskCache: Send + Sync {
    /// Overwrite the cached snapshot for an employee.
    async fn write_tasks(&self, employee_id: Uuid, tasks: &[Task]) -> DocStoreResult<()>;

    /// Read the cached snapshot for an employee, if one exists.
    async fn read_tasks(&self, employee_id: Uuid) -> DocStoreResult<Option<Vec<Task>>>;
}

/// In-memory task cache (for testing and single-process mode).
#[derive(Debug, Default)]
pub struct MemoryTaskCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTaskCache {
    /// Create a new in-memory cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskCache for MemoryTaskCache {
    async fn write_tasks(&self, employee_id: Uuid, tasks: &[Task]) -> DocStoreResult<()> {
        let payload = serde_json::to_string(tasks)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DocStoreError::Other(format!("Lock poisoned: {}", e)))?;
        entries.insert(cache_key(employee_id), payload);
        Ok(())
    }

    async fn read_tasks(&self, employee_id: Uuid) -> DocStoreResult<Option<Vec<Task>>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DocStoreError::Other(format!("Lock poisoned: {}", e)))?;
        entries
            .get(&cache_key(employee_id))
            .map(|payload| serde_json::from_str(payload).map_err(DocStoreError::from))
            .transpose()
    }
}
