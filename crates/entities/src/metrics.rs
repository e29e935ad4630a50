//! Aggregate progress metrics over an employee's task list.

use serde::{Deserialize, Serialize};

use crate::{Task, TaskState};

/// Mean per-task score, rounded to the nearest integer.
///
/// Defined as 0 for an empty task list.
pub fn progress_percent(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let total: u32 = tasks.iter().map(|t| u32::from(t.score())).sum();
    (f64::from(total) / tasks.len() as f64).round() as u8
}

/// Coarse task counts for charting.
///
/// The three buckets are disjoint and always sum to the total task count;
/// the bucketing is independent of the scoring function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBuckets {
    /// Completed on time.
    pub completed_on_time: usize,
    /// Completed after the deadline.
    pub completed_late: usize,
    /// Not completed, whether or not the deadline has passed.
    pub outstanding: usize,
}

impl StatusBuckets {
    /// Counts the given tasks into buckets.
    pub fn tally(tasks: &[Task]) -> Self {
        let mut buckets = Self::default();
        for task in tasks {
            match task.state() {
                TaskState::Completed => buckets.completed_on_time += 1,
                TaskState::LateSubmitted => buckets.completed_late += 1,
                TaskState::Pending | TaskState::DeadlineMissed => buckets.outstanding += 1,
            }
        }
        buckets
    }

    /// Total across all buckets.
    pub fn total(&self) -> usize {
        self.completed_on_time + self.completed_late + self.outstanding
    }
}
