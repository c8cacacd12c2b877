use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::{TaskId, TaskStatus};

/// Stage type. Owned by the transition policy; the scheduler only compares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One stage instance embedded in a game.
///
/// Design:
/// - Created by a policy mutator, mutated in place by the scheduler (status, window).
/// - `transition_initiated` / `transition_expires` are only ever written together
///   through [`Task::open_window`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub transition_initiated: Option<DateTime<Utc>>,
    pub transition_expires: Option<DateTime<Utc>>,
    /// Type-specific data, opaque to the scheduler.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Task {
    /// A fresh stage in `Pending` with no timing window yet.
    pub fn new(id: TaskId, task_type: TaskType, payload: serde_json::Value) -> Self {
        Self {
            id,
            task_type,
            status: TaskStatus::Pending,
            transition_initiated: None,
            transition_expires: None,
            payload,
        }
    }

    /// Start a new timing window of length `delay` at `now`.
    ///
    /// `expires - initiated == delay` holds exactly, including `delay == 0`.
    pub fn open_window(&mut self, now: DateTime<Utc>, delay: Duration) {
        let length = TimeDelta::from_std(delay).unwrap_or(TimeDelta::MAX);
        self.transition_initiated = Some(now);
        self.transition_expires = Some(
            now.checked_add_signed(length)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        );
    }

    /// Length of the current window, if one was opened.
    pub fn window(&self) -> Option<TimeDelta> {
        match (self.transition_initiated, self.transition_expires) {
            (Some(initiated), Some(expires)) => Some(expires - initiated),
            _ => None,
        }
    }
}
