use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::JobOutcome;
use crate::ports::FiredJobSource;

use super::Scheduler;

/// Worker group handle.
/// - `request_shutdown()` でワーカー全体が止まる
/// - `shutdown_and_join()` で全ワーカーの終了を待てる
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` workers feeding fired jobs into `scheduler`.
    pub fn spawn(n: usize, source: Arc<dyn FiredJobSource>, scheduler: Arc<Scheduler>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let source = Arc::clone(&source);
            let scheduler = Arc::clone(&scheduler);
            let mut rx = shutdown_rx.clone();

            let join = tokio::spawn(async move {
                worker_loop(worker_id, source, scheduler, &mut rx).await;
            });
            joins.push(join);
        }

        Self { shutdown_tx, joins }
    }

    /// Request shutdown for all workers.
    /// In-flight jobs are finished; no new job is taken.
    pub fn request_shutdown(&self) {
        // ignore send error: receivers may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for j in self.joins {
            let _ = j.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    source: Arc<dyn FiredJobSource>,
    scheduler: Arc<Scheduler>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    loop {
        // shutdown が来ていたら抜ける
        if *shutdown_rx.borrow() {
            break;
        }

        // next_fired は「待つ」ので select で shutdown と競合させる
        let job = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    // sender dropped: nobody can stop us anymore, treat as shutdown
                    break;
                }
                continue;
            }
            job = source.next_fired() => job,
        };

        let Some(job) = job else {
            info!(worker_id, "job source closed; worker exiting");
            break;
        };

        let job_id = job.id();
        match scheduler.process(job).await {
            JobOutcome::Transitioned => debug!(worker_id, job_id = %job_id, "job processed"),
            JobOutcome::Stale => debug!(worker_id, job_id = %job_id, "stale job dropped"),
            // already logged by the scheduler
            JobOutcome::Failed => {}
        }
    }
}
