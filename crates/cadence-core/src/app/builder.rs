//! SchedulerBuilder - Scheduler の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）：必須の port が欠けていれば build() が失敗する

use std::sync::Arc;

use tracing::{Span, info_span};

use crate::config::SchedulerConfig;
use crate::ports::{Clock, DeferredJobQueue, EventPublisher, GameStore, SystemClock, TransitionPolicy};

use super::Scheduler;

/// SchedulerBuilder は Scheduler を構築
///
/// # 使用例
/// ```ignore
/// let scheduler = SchedulerBuilder::new()
///     .store(store.clone())
///     .queue(queue.clone())
///     .publisher(publisher.clone())
///     .policy(Arc::new(QuizPolicy::default()))
///     .build()?;
/// ```
///
/// Clock は省略すると SystemClock、config は SchedulerConfig::default()、
/// span は `task_scheduler` になります。
#[derive(Default)]
pub struct SchedulerBuilder {
    store: Option<Arc<dyn GameStore>>,
    queue: Option<Arc<dyn DeferredJobQueue>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    policy: Option<Arc<dyn TransitionPolicy>>,
    clock: Option<Arc<dyn Clock>>,
    config: Option<SchedulerConfig>,
    span: Option<Span>,
}

/// BuildError は Scheduler 構築時のエラー
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Missing port: {0}. Every scheduler needs a store, a queue, a publisher and a policy.")]
    MissingPort(&'static str),
}

impl SchedulerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn queue(mut self, queue: Arc<dyn DeferredJobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn TransitionPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Span every log line of this scheduler is recorded under.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// # 検証
    /// - store / queue / publisher / policy が全て設定されているかチェック
    /// - 不足があれば最初に見つかったものを BuildError::MissingPort で返す
    pub fn build(self) -> Result<Scheduler, BuildError> {
        Ok(Scheduler {
            store: self.store.ok_or(BuildError::MissingPort("store"))?,
            queue: self.queue.ok_or(BuildError::MissingPort("queue"))?,
            publisher: self.publisher.ok_or(BuildError::MissingPort("publisher"))?,
            policy: self.policy.ok_or(BuildError::MissingPort("policy"))?,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config: self.config.unwrap_or_default(),
            span: self.span.unwrap_or_else(|| info_span!("task_scheduler")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{BroadcastPublisher, InMemoryDeferredQueue, InMemoryGameStore};
    use crate::testing::ScriptedPolicy;

    fn complete() -> SchedulerBuilder {
        SchedulerBuilder::new()
            .store(Arc::new(InMemoryGameStore::new()))
            .queue(Arc::new(InMemoryDeferredQueue::new()))
            .publisher(Arc::new(BroadcastPublisher::new(4)))
            .policy(Arc::new(ScriptedPolicy::new(["lobby", "quit"])))
    }

    #[test]
    fn test_build_success_with_defaults() {
        let scheduler = complete().build().unwrap();
        assert_eq!(scheduler.config(), &SchedulerConfig::default());
    }

    #[test]
    fn test_build_keeps_custom_config() {
        let config = SchedulerConfig {
            workers: 8,
            ..SchedulerConfig::default()
        };
        let scheduler = complete().config(config.clone()).build().unwrap();
        assert_eq!(scheduler.config(), &config);
    }

    #[test]
    fn test_build_missing_policy() {
        let result = SchedulerBuilder::new()
            .store(Arc::new(InMemoryGameStore::new()))
            .queue(Arc::new(InMemoryDeferredQueue::new()))
            .publisher(Arc::new(BroadcastPublisher::new(4)))
            .build();
        assert!(matches!(result, Err(BuildError::MissingPort("policy"))));
    }

    #[test]
    fn test_build_reports_first_missing_port() {
        let result = SchedulerBuilder::new().build();
        assert!(matches!(result, Err(BuildError::MissingPort("store"))));
    }
}
