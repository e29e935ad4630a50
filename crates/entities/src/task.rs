//! Task entity definitions and the classification/scoring model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived state of a task, computed at read time and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Not completed, deadline not yet passed.
    Pending,
    /// Not completed, deadline passed.
    DeadlineMissed,
    /// Completed on time.
    Completed,
    /// Completed after the deadline.
    LateSubmitted,
}

impl TaskState {
    /// Converts the state to a string for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::DeadlineMissed => "deadline_missed",
            Self::Completed => "completed",
            Self::LateSubmitted => "late_submitted",
        }
    }

    /// Returns the human-readable label shown on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::DeadlineMissed => "Deadline Missed",
            Self::Completed => "Completed",
            Self::LateSubmitted => "Late Submitted",
        }
    }

    /// Parses a state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "deadline_missed" => Some(Self::DeadlineMissed),
            "completed" => Some(Self::Completed),
            "late_submitted" => Some(Self::LateSubmitted),
            _ => None,
        }
    }
}

/// A unit of work with a deadline, owned by exactly one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning employee ID.
    pub employee_id: Uuid,
    /// Task name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Submission deadline (calendar date, UTC).
    pub due_date: NaiveDate,
    /// Whether the task has been submitted.
    pub completed: bool,
    /// Whether the submission was late. Only meaningful when `completed`.
    pub late: bool,
    /// Email address the task was assigned under.
    pub email: Option<String>,
    /// When the task was marked completed. Scores are frozen at this point.
    pub completed_at: Option<DateTime<Utc>>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task for the given employee.
    pub fn new(employee_id: Uuid, name: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            name: name.into(),
            description: None,
            due_date,
            completed: false,
            late: false,
            email: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the associated email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Marks the task completed at the given instant.
    pub fn mark_completed(&mut self, late: bool, at: DateTime<Utc>) {
        self.completed = true;
        self.late = late;
        self.completed_at = Some(at);
    }

    /// Classifies the task relative to `as_of`.
    ///
    /// An incomplete task is classified by comparing `as_of` to the deadline
    /// by calendar date, never by the `late` flag.
    pub fn state_at(&self, as_of: DateTime<Utc>) -> TaskState {
        if self.completed {
            if self.late {
                TaskState::LateSubmitted
            } else {
                TaskState::Completed
            }
        } else if as_of.date_naive() <= self.due_date {
            TaskState::Pending
        } else {
            TaskState::DeadlineMissed
        }
    }

    /// Classifies the task as of the current time.
    pub fn state(&self) -> TaskState {
        self.state_at(Utc::now())
    }

    /// Whole days elapsed past the deadline at `as_of`, rounded up.
    ///
    /// Zero or negative means `as_of` is on or before the deadline.
    pub fn days_overdue(&self, as_of: DateTime<Utc>) -> i64 {
        let due_start = self.due_date.and_time(NaiveTime::MIN).and_utc();
        let secs = (as_of - due_start).num_seconds();
        secs.div_euclid(86_400) + i64::from(secs.rem_euclid(86_400) > 0)
    }

    /// Scores the task relative to `as_of`.
    ///
    /// Incomplete tasks score 0. Completed tasks score 100 on or before the
    /// deadline, 80 up to 20 days past it, and 70 beyond that.
    pub fn score_at(&self, as_of: DateTime<Utc>) -> u8 {
        if !self.completed {
            return 0;
        }
        let overdue = self.days_overdue(as_of);
        if overdue <= 0 {
            100
        } else if overdue <= 20 {
            80
        } else {
            70
        }
    }

    /// Scores the task, frozen at its completion time.
    ///
    /// Tasks recorded before `completed_at` existed fall back to the current
    /// time.
    pub fn score(&self) -> u8 {
        self.score_at(self.completed_at.unwrap_or_else(Utc::now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_pending_iff_incomplete_and_before_deadline() {
        let task = Task::new(Uuid::new_v4(), "Report", date(2024, 1, 10));

        assert_eq!(task.state_at(instant(2024, 1, 5, 12)), TaskState::Pending);
        // Deadline day itself still counts as pending.
        assert_eq!(task.state_at(instant(2024, 1, 10, 23)), TaskState::Pending);
        assert_eq!(
            task.state_at(instant(2024, 1, 11, 0)),
            TaskState::DeadlineMissed
        );
    }

    #[test]
    fn test_completed_states_ignore_deadline() {
        let mut on_time = Task::new(Uuid::new_v4(), "Report", date(2024, 1, 10));
        on_time.mark_completed(false, instant(2024, 3, 1, 0));
        assert_eq!(on_time.state_at(instant(2024, 3, 1, 0)), TaskState::Completed);

        let mut late = Task::new(Uuid::new_v4(), "Report", date(2024, 1, 10));
        late.mark_completed(true, instant(2024, 3, 1, 0));
        assert_eq!(
            late.state_at(instant(2024, 3, 1, 0)),
            TaskState::LateSubmitted
        );
    }

    #[test]
    fn test_incomplete_scores_zero() {
        let task = Task::new(Uuid::new_v4(), "Report", date(2024, 1, 1));
        assert_eq!(task.score_at(instant(2024, 6, 1, 0)), 0);
    }

    #[test]
    fn test_score_bands() {
        let mut task = Task::new(Uuid::new_v4(), "Report", date(2024, 1, 10));
        task.mark_completed(false, instant(2024, 1, 10, 0));

        // On the deadline: diff is 0 days.
        assert_eq!(task.score_at(instant(2024, 1, 10, 0)), 100);
        // Any time past deadline midnight rounds up to a full day.
        assert_eq!(task.score_at(instant(2024, 1, 10, 6)), 80);
        assert_eq!(task.score_at(instant(2024, 1, 30, 0)), 80);
        assert_eq!(task.score_at(instant(2024, 1, 31, 0)), 70);
        // Before the deadline scores full marks.
        assert_eq!(task.score_at(instant(2024, 1, 2, 0)), 100);
    }

    #[test]
    fn test_score_is_frozen_at_completion() {
        let mut task = Task::new(Uuid::new_v4(), "Report", date(2024, 1, 10));
        task.mark_completed(false, instant(2024, 1, 10, 0));

        // Long after completion the frozen score is unchanged.
        assert_eq!(task.score(), 100);
    }

    #[test]
    fn test_days_overdue_ceiling() {
        let task = Task::new(Uuid::new_v4(), "Report", date(2024, 1, 10));

        assert_eq!(task.days_overdue(instant(2024, 1, 10, 0)), 0);
        assert_eq!(task.days_overdue(instant(2024, 1, 10, 1)), 1);
        assert_eq!(task.days_overdue(instant(2024, 1, 11, 0)), 1);
        assert_eq!(task.days_overdue(instant(2024, 1, 9, 12)), 0);
        assert_eq!(task.days_overdue(instant(2024, 1, 8, 0)), -2);
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(TaskState::DeadlineMissed.as_str(), "deadline_missed");
        assert_eq!(
            TaskState::parse("deadline_missed"),
            Some(TaskState::DeadlineMissed)
        );
        assert_eq!(TaskState::LateSubmitted.label(), "Late Submitted");
    }
}
