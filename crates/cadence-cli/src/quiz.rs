//! Quiz stage graph used by the demo.
//!
//! lobby → question → question_result → leaderboard → question → … →
//! question_result → podium → quit

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cadence_core::domain::{Game, MutationError, Task, TaskStatus, TaskType};
use cadence_core::ports::{IdGenerator, StageMutator, TransitionPolicy};

pub const LOBBY: &str = "lobby";
pub const QUESTION: &str = "question";
pub const QUESTION_RESULT: &str = "question_result";
pub const LEADERBOARD: &str = "leaderboard";
pub const PODIUM: &str = "podium";
pub const QUIT: &str = "quit";

/// How long each stage stays active.
#[derive(Debug, Clone)]
pub struct QuizTimings {
    pub lobby: Duration,
    pub question: Duration,
    pub question_result: Duration,
    pub leaderboard: Duration,
    pub podium: Duration,
}

impl Default for QuizTimings {
    fn default() -> Self {
        Self {
            lobby: Duration::from_secs(2),
            question: Duration::from_secs(5),
            question_result: Duration::from_secs(2),
            leaderboard: Duration::from_secs(2),
            podium: Duration::from_secs(3),
        }
    }
}

/// Stage payload: which question the stage belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionIndex {
    #[serde(default)]
    pub question: usize,
}

impl QuestionIndex {
    fn of(task: &Task) -> Self {
        serde_json::from_value(task.payload.clone()).unwrap_or_default()
    }
}

pub struct QuizPolicy {
    questions: usize,
    timings: QuizTimings,
    ids: Arc<dyn IdGenerator>,
}

impl QuizPolicy {
    pub fn new(questions: usize, timings: QuizTimings, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            questions: questions.max(1),
            timings,
            ids,
        }
    }

    pub fn first_stage(&self) -> Task {
        self.stage(LOBBY, QuestionIndex::default())
    }

    fn stage(&self, task_type: &str, index: QuestionIndex) -> Task {
        let payload = serde_json::to_value(index).unwrap_or_default();
        Task::new(self.ids.generate_task_id(), TaskType::new(task_type), payload)
    }

    fn next_stage(&self, current: &Task) -> Option<(&'static str, QuestionIndex)> {
        let index = QuestionIndex::of(current);
        let next = match current.task_type.as_str() {
            LOBBY => (QUESTION, QuestionIndex { question: 0 }),
            QUESTION => (QUESTION_RESULT, index),
            QUESTION_RESULT if index.question + 1 < self.questions => (LEADERBOARD, index),
            QUESTION_RESULT => (PODIUM, index),
            LEADERBOARD => (
                QUESTION,
                QuestionIndex {
                    question: index.question + 1,
                },
            ),
            PODIUM => (QUIT, index),
            _ => return None,
        };
        Some(next)
    }
}

impl TransitionPolicy for QuizPolicy {
    fn mutator(&self, game: &Game) -> StageMutator {
        let task = &game.current_task;
        if task.status != TaskStatus::Completed {
            return Arc::new(|_: &mut Game| Ok(()));
        }
        match self.next_stage(task) {
            Some((task_type, index)) => {
                let next = self.stage(task_type, index);
                Arc::new(move |g: &mut Game| {
                    g.advance_to(next.clone());
                    Ok(())
                })
            }
            None => {
                let stuck = task.task_type.clone();
                Arc::new(move |_: &mut Game| {
                    Err(MutationError::Policy(format!("no stage follows `{stuck}`")))
                })
            }
        }
    }

    fn delay(&self, game: &Game) -> Duration {
        let task = &game.current_task;
        if task.status != TaskStatus::Active {
            return Duration::ZERO;
        }
        match task.task_type.as_str() {
            LOBBY => self.timings.lobby,
            QUESTION => self.timings.question,
            QUESTION_RESULT => self.timings.question_result,
            LEADERBOARD => self.timings.leaderboard,
            PODIUM => self.timings.podium,
            _ => Duration::ZERO,
        }
    }
}
