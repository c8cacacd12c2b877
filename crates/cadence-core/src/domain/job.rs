//! Deferred transition jobs and their identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::{Game, Task, TaskStatus, TaskType};

/// Deterministic key of a deferred transition.
///
/// Format: `{task_id}:{task_type}:{status}`. The task id has a fixed shape
/// and the status is one of three fixed tokens, so two different
/// (task, type, status) triples can never render to the same key even if the
/// type itself contains `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionJobId(String);

impl TransitionJobId {
    pub fn for_task(task: &Task) -> Self {
        Self(format!("{}:{}:{}", task.id, task.task_type, task.status))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransitionJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Queue ordering hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPriority(pub u8);

impl JobPriority {
    pub const IMMEDIATE: JobPriority = JobPriority(0);
    pub const TIMED: JobPriority = JobPriority(1);

    /// Timed jobs win over zero-delay ones when both are due.
    pub fn for_delay(delay: Duration) -> Self {
        if delay.is_zero() {
            JobPriority::IMMEDIATE
        } else {
            JobPriority::TIMED
        }
    }
}

/// Payload of a deferred transition: the game as it was when the window
/// opened, plus the (type, status) the job is meant to move on from.
///
/// This is the only wire-level shape the scheduler hands to a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionJob {
    pub game: Game,
    pub task_type: TaskType,
    pub status: TaskStatus,
}

impl TransitionJob {
    pub fn snapshot(game: &Game) -> Self {
        Self {
            game: game.clone(),
            task_type: game.current_task.task_type.clone(),
            status: game.current_task.status,
        }
    }

    /// Key this job was (or would be) registered under.
    pub fn id(&self) -> TransitionJobId {
        TransitionJobId::for_task(&self.game.current_task)
    }

    /// Whether `latest` still sits on the stage/status this job was created for.
    pub fn matches(&self, latest: &Game) -> bool {
        latest.current_task.task_type == self.task_type && latest.current_task.status == self.status
    }
}

/// What happened to a fired job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The transition was applied (and possibly cascaded further).
    Transitioned,

    /// The game had already moved on; nothing was touched.
    Stale,

    /// Processing failed; the error was logged and the job removed.
    Failed,
}
