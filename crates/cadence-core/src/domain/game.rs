//! Game aggregate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{GameId, ParticipantId, Task, TaskType};

/// Per-game policy flags.
///
/// A stage type listed in `auto_complete` may complete with a zero-length
/// window (host-only games with nobody to wait on).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default)]
    pub auto_complete: BTreeSet<TaskType>,
}

impl GameSettings {
    pub fn with_auto_complete<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskType>,
    {
        Self {
            auto_complete: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows_auto_complete(&self, task_type: &TaskType) -> bool {
        self.auto_complete.contains(task_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub nickname: String,
}

/// Aggregate root. Owned by the game store; everything else works on copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    #[serde(default)]
    pub settings: GameSettings,
    pub current_task: Task,
    /// Append-only history of retired stages.
    #[serde(default)]
    pub previous_tasks: Vec<Task>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Game {
    pub fn new(id: GameId, settings: GameSettings, first_task: Task) -> Self {
        Self {
            id,
            settings,
            current_task: first_task,
            previous_tasks: Vec::new(),
            participants: Vec::new(),
        }
    }

    /// Retire the current task into the history and install `next`.
    pub fn advance_to(&mut self, next: Task) {
        let retired = std::mem::replace(&mut self.current_task, next);
        self.previous_tasks.push(retired);
    }

    pub fn join(&mut self, participant: Participant) {
        self.participants.push(participant);
    }
}
