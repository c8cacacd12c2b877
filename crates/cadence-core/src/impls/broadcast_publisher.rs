//! BroadcastPublisher - tokio broadcast チャネルでゲーム状態を配る
//!
//! 購読者がいなくても失敗扱いにしません（誰も見ていないだけ）。
//! 遅い購読者は `RecvError::Lagged` で古い状態を取りこぼします。

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{Game, PublishError};
use crate::ports::EventPublisher;

/// Fan-out of persisted game states to in-process subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<Game>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent states.
    pub fn subscribe(&self) -> broadcast::Receiver<Game> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, game: &Game) -> Result<(), PublishError> {
        let _ = self.sender.send(game.clone());
        Ok(())
    }
}
