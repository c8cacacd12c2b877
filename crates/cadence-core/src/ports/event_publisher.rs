//! EventPublisher port - ゲーム状態の通知
//!
//! fire-and-forget です。失敗は scheduler 側でログに残すだけで、
//! 呼び出し元へは伝播しません。

use async_trait::async_trait;

use crate::domain::{Game, PublishError};

/// EventPublisher は保存済みのゲーム状態を観測者へ流す
///
/// 同じ経路では必ず GameStore への保存が成功した後に呼ばれます。
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, game: &Game) -> Result<(), PublishError>;
}
