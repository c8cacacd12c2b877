//! Stage status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single stage instance.
///
/// State transitions:
/// - Pending -> Active -> Completed
///
/// `Completed` is terminal for the stage instance. Only a policy mutator that
/// replaces the current task (new type) moves the game past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Freshly entered, waiting for the stage to open.
    Pending,

    /// Open: participants may act until the window expires.
    Active,

    /// Finished; the policy decides what comes next.
    Completed,
}

impl TaskStatus {
    /// Next status on the automatic path, `None` once completed.
    pub fn next(self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Pending => Some(TaskStatus::Active),
            TaskStatus::Active => Some(TaskStatus::Completed),
            TaskStatus::Completed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Active => "active",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
