//! InMemoryDeferredQueue - 開発用の遅延ジョブキュー
//!
//! # 実装詳細
//! - HashMap<TransitionJobId, Entry> がジョブの正本
//! - BinaryHeap は (due_at, priority, seq, id) だけを持つ（削除は遅延評価）
//! - Notify で add / close を待機中のワーカーに通知
//!
//! 発火済みのジョブは remove されるまで `get` から見え続けます（at-least-once）。

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::debug;

use crate::domain::{JobPriority, QueueError, TransitionJob, TransitionJobId};
use crate::ports::{DeferredJobQueue, FiredJobSource};

/// Heap entry. Earliest due first, then higher priority, then FIFO.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled {
    due_at: Instant,
    priority: JobPriority,
    seq: u64,
    id: TransitionJobId,
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: the "greatest" entry must be the one to fire first.
        other
            .due_at
            .cmp(&self.due_at)
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
struct Entry {
    job: TransitionJob,
    seq: u64,
    fired: bool,
}

#[derive(Debug, Default)]
struct QueueState {
    jobs: HashMap<TransitionJobId, Entry>,
    scheduled: BinaryHeap<Scheduled>,
    next_seq: u64,
    closed: bool,
}

enum Poll {
    Fired(TransitionJob),
    WaitUntil(Instant),
    WaitForever,
    Closed,
}

impl QueueState {
    fn poll(&mut self, now: Instant) -> Poll {
        if self.closed {
            return Poll::Closed;
        }

        while let Some(top) = self.scheduled.peek() {
            if top.due_at > now {
                return Poll::WaitUntil(top.due_at);
            }
            let Some(top) = self.scheduled.pop() else {
                break;
            };
            // Removed (or re-added) jobs leave stale heap entries behind.
            if let Some(entry) = self.jobs.get_mut(&top.id)
                && entry.seq == top.seq
                && !entry.fired
            {
                entry.fired = true;
                return Poll::Fired(entry.job.clone());
            }
        }
        Poll::WaitForever
    }

    fn counts(&self) -> QueueCounts {
        let fired = self.jobs.values().filter(|entry| entry.fired).count();
        QueueCounts {
            scheduled: self.jobs.len() - fired,
            fired,
        }
    }
}

/// Observability snapshot of the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    /// Waiting for their delay to elapse.
    pub scheduled: usize,
    /// Delivered to a worker but not removed yet.
    pub fired: usize,
}

/// In-process delayed job queue.
///
/// # 使用例
/// ```ignore
/// let queue = InMemoryDeferredQueue::new();
/// queue.add(id, job, Duration::from_secs(5), JobPriority::TIMED).await?;
/// let fired = queue.next_fired().await; // ~5s later
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDeferredQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl InMemoryDeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop delivering. Waiting `next_fired` calls return `None`.
    pub async fn close(&self) {
        self.state.lock().await.closed = true;
        self.notify.notify_waiters();
    }

    pub async fn counts(&self) -> QueueCounts {
        self.state.lock().await.counts()
    }
}

#[async_trait]
impl DeferredJobQueue for InMemoryDeferredQueue {
    async fn add(
        &self,
        id: TransitionJobId,
        job: TransitionJob,
        delay: Duration,
        priority: JobPriority,
    ) -> Result<(), QueueError> {
        {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(QueueError::Closed);
            }
            if state.jobs.contains_key(&id) {
                // BullMQ と同じく、同じ id の二重登録は最初のものが勝つ
                debug!(job_id = %id, "job already registered; ignoring duplicate add");
                return Ok(());
            }

            let seq = state.next_seq;
            state.next_seq += 1;
            state.scheduled.push(Scheduled {
                due_at: Instant::now() + delay,
                priority,
                seq,
                id: id.clone(),
            });
            state.jobs.insert(
                id,
                Entry {
                    job,
                    seq,
                    fired: false,
                },
            );
        } // Lock released here

        self.notify.notify_one();
        Ok(())
    }

    async fn get(&self, id: &TransitionJobId) -> Result<Option<TransitionJob>, QueueError> {
        let state = self.state.lock().await;
        Ok(state.jobs.get(id).map(|entry| entry.job.clone()))
    }

    async fn remove(&self, id: &TransitionJobId) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        state.jobs.remove(id);
        Ok(())
    }
}

#[async_trait]
impl FiredJobSource for InMemoryDeferredQueue {
    async fn next_fired(&self) -> Option<TransitionJob> {
        loop {
            // Register interest before inspecting state so a concurrent add/close is not missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let poll = {
                let mut state = self.state.lock().await;
                state.poll(Instant::now())
            };

            match poll {
                Poll::Fired(job) => return Some(job),
                Poll::Closed => return None,
                Poll::WaitUntil(wake_at) => {
                    tokio::select! {
                        _ = &mut notified => {},
                        _ = tokio::time::sleep_until(wake_at) => {},
                    }
                }
                Poll::WaitForever => notified.await,
            }
        }
    }
}
