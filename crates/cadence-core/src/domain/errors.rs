//! Errors - エラー型と分類
//!
//! - **MutationError**: policy の mutator が返す失敗（保存されない）
//! - **StoreError / QueueError / PublishError**: 各 port の失敗
//! - **SchedulerError**: scheduler から呼び出し元へ伝播する失敗

use std::error::Error;

use thiserror::Error;

use super::GameId;

/// A mutator refused to change the game. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("policy rejected mutation: {0}")]
    Policy(String),
}

/// Failure of the game store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("game `{0}` not found")]
    NotFound(GameId),

    #[error("game store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    #[error("mutation aborted")]
    Mutation(#[from] MutationError),
}

impl StoreError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StoreError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// Failure of the deferred job queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("deferred queue is closed")]
    Closed,

    #[error("deferred queue operation failed: {0}")]
    OperationFailed(String),
}

/// Failure of the event publisher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("publish rejected: {0}")]
    Rejected(String),
}

/// Errors the scheduler hands back to its caller.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("game store failure")]
    Store(#[from] StoreError),

    #[error("deferred queue failure")]
    Queue(#[from] QueueError),

    #[error("game `{game_id}` cascaded more than {limit} transitions without a timer")]
    CascadeLimitExceeded { game_id: GameId, limit: usize },
}
