//! DeferredJobQueue port - 遅延ジョブの登録・参照・取り消し
//!
//! 配送は at-least-once です。遅れて届くことも、重複して届くこともあります。
//! scheduler 側は受け取ったジョブを正本と照合してから動くので、
//! キューが重複 id を拒否しなくても正しく動作します。

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{JobPriority, QueueError, TransitionJob, TransitionJobId};

/// Registration side of the delayed-job broker.
#[async_trait]
pub trait DeferredJobQueue: Send + Sync {
    /// Register `job` to fire after `delay`.
    async fn add(
        &self,
        id: TransitionJobId,
        job: TransitionJob,
        delay: Duration,
        priority: JobPriority,
    ) -> Result<(), QueueError>;

    /// Outstanding job under `id`, if any.
    async fn get(&self, id: &TransitionJobId) -> Result<Option<TransitionJob>, QueueError>;

    /// Cancel (or clean up) the job under `id`. Removing an unknown id is not an error.
    async fn remove(&self, id: &TransitionJobId) -> Result<(), QueueError>;
}

/// Delivery side: hands out jobs whose delay has elapsed.
#[async_trait]
pub trait FiredJobSource: Send + Sync {
    /// Wait for the next due job. `None` once the source is closed.
    async fn next_fired(&self) -> Option<TransitionJob>;
}
