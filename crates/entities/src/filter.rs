//! Date-range filtering over task lists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Task;

/// An optional from/to bound on task deadlines.
///
/// Comparison is by calendar date only; both bounds are inclusive and an
/// absent bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Keep tasks due on or after this date.
    pub from: Option<NaiveDate>,
    /// Keep tasks due on or before this date.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Creates an unbounded range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lower bound.
    pub fn with_from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the upper bound.
    pub fn with_to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }

    /// Returns true if both bounds are absent.
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Returns true if `date` falls within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Returns the tasks whose deadline falls within the range.
    ///
    /// The input list is never mutated.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks
            .iter()
            .filter(|t| self.contains(t.due_date))
            .cloned()
            .collect()
    }
}
