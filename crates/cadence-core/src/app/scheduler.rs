//! Scheduler - ステージ遷移のスケジューリング
//!
//! # フロー
//! 1. `schedule_task_transition`: タイミングウィンドウを開き、遅延ジョブを登録
//!    （delay が 0 ならその場で遷移）
//! 2. `perform_transition`: 1 回の load-mutate-save でステータス／ステージを進める
//! 3. `perform_post_transition`: まだ自動で進めるべきかを判定し、必要なら 1 に戻る
//! 4. `process`: 発火した遅延ジョブを正本と照合してから 2 を実行
//!
//! 1 → 2 → 3 → 1 … の連鎖は再帰ではなく [`Step`] のループで回します。

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, Span, debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::domain::{
    Game, JobOutcome, JobPriority, MutationError, SchedulerError, TaskStatus, TransitionJob,
    TransitionJobId, should_schedule_post_task_transition,
};
use crate::ports::{
    Clock, DeferredJobQueue, EventPublisher, GameStore, StageMutator, TransitionPolicy,
};

/// One unit of work in a cascade.
enum Step {
    Schedule(Game),
    Transition {
        game: Game,
        next_status: Option<TaskStatus>,
        mutator: StageMutator,
    },
    PostTransition(Game),
    Halt,
}

/// Result of one load-mutate-save transition.
enum Applied {
    Continue(Step),
    /// The stored stage no longer matches the snapshot; nothing was changed.
    Superseded,
    /// Persisting or publishing failed (already logged).
    Failed,
}

/// Drives games from stage to stage.
///
/// Stateless between calls: everything it knows about a game comes from the
/// store, and the only thing it leaves behind is a job in the queue.
/// Build one with [`SchedulerBuilder`](super::SchedulerBuilder).
pub struct Scheduler {
    pub(super) store: Arc<dyn GameStore>,
    pub(super) queue: Arc<dyn DeferredJobQueue>,
    pub(super) publisher: Arc<dyn EventPublisher>,
    pub(super) policy: Arc<dyn TransitionPolicy>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) config: SchedulerConfig,
    pub(super) span: Span,
}

impl Scheduler {
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Make sure exactly one path toward the next status of the current stage is in flight.
    ///
    /// - a job for this (task, type, status) exists and the stage is active: the job
    ///   is cancelled and the transition runs now (fast-forward)
    /// - a job exists for any other status: no-op
    /// - otherwise a fresh window is opened and a job registered (or, for a zero
    ///   delay, the transition runs synchronously)
    pub async fn schedule_task_transition(&self, game: &Game) -> Result<(), SchedulerError> {
        self.drive(Step::Schedule(game.clone()))
            .instrument(self.span.clone())
            .await
    }

    /// Apply one status/stage change and whatever it triggers.
    ///
    /// Failures of the transition itself are logged and swallowed; only a
    /// failing post-transition cascade is returned.
    pub async fn perform_transition(
        &self,
        game: &Game,
        next_status: Option<TaskStatus>,
        mutator: StageMutator,
    ) -> Result<(), SchedulerError> {
        let step = Step::Transition {
            game: game.clone(),
            next_status,
            mutator,
        };
        self.drive(step).instrument(self.span.clone()).await
    }

    /// Decide whether `game` keeps auto-advancing, and schedule it if so.
    pub async fn perform_post_transition(&self, game: &Game) -> Result<(), SchedulerError> {
        self.drive(Step::PostTransition(game.clone()))
            .instrument(self.span.clone())
            .await
    }

    /// Handle a fired job. Never fails: errors are logged and reported as
    /// [`JobOutcome::Failed`].
    pub async fn process(&self, job: TransitionJob) -> JobOutcome {
        async {
            let job_id = job.id();
            match self.try_process(&job_id, &job).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    if let Err(remove_err) = self.queue.remove(&job_id).await {
                        warn!(
                            job_id = %job_id,
                            error = %remove_err,
                            "failed to remove job after error"
                        );
                    }
                    error!(
                        game_id = %job.game.id,
                        job_id = %job_id,
                        error = %err,
                        "failed to process transition job"
                    );
                    JobOutcome::Failed
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }

    async fn try_process(
        &self,
        job_id: &TransitionJobId,
        job: &TransitionJob,
    ) -> Result<JobOutcome, SchedulerError> {
        let latest = self.store.load_by_id(job.game.id).await?;
        if !job.matches(&latest) {
            warn!(
                game_id = %latest.id,
                job_id = %job_id,
                expected_type = %job.task_type,
                expected_status = %job.status,
                task_type = %latest.current_task.task_type,
                status = %latest.current_task.status,
                "game moved on since the job was scheduled; ignoring"
            );
            // cannot match again: status only moves forward
            if let Err(err) = self.queue.remove(job_id).await {
                warn!(job_id = %job_id, error = %err, "failed to remove stale job");
            }
            return Ok(JobOutcome::Stale);
        }

        if self.queue.get(job_id).await?.is_some() {
            self.queue.remove(job_id).await?;
        }

        let mutator = self.policy.mutator(&latest);
        match self.transition(&job.game, job.status.next(), &mutator).await {
            Applied::Continue(next) => {
                self.drive(next).await?;
                Ok(JobOutcome::Transitioned)
            }
            Applied::Superseded => Ok(JobOutcome::Stale),
            Applied::Failed => Ok(JobOutcome::Failed),
        }
    }

    /// Trampoline over [`Step`]s.
    async fn drive(&self, first: Step) -> Result<(), SchedulerError> {
        let limit = self.config.max_cascade_depth;
        let mut hops = 0usize;
        let mut step = first;

        loop {
            step = match step {
                Step::Halt => return Ok(()),
                Step::Schedule(game) => {
                    let game_id = game.id;
                    match self.schedule(game).await {
                        Ok(next) => next,
                        Err(err) => {
                            if hops > 0 {
                                error!(
                                    game_id = %game_id,
                                    error = %err,
                                    "post-transition scheduling failed"
                                );
                            }
                            return Err(err);
                        }
                    }
                }
                Step::Transition {
                    game,
                    next_status,
                    mutator,
                } => match self.transition(&game, next_status, &mutator).await {
                    Applied::Continue(next) => next,
                    Applied::Superseded | Applied::Failed => Step::Halt,
                },
                Step::PostTransition(game) => {
                    let next = self.post_transition(game);
                    if let Step::Schedule(game) = &next {
                        hops += 1;
                        if hops > limit {
                            let err = SchedulerError::CascadeLimitExceeded {
                                game_id: game.id,
                                limit,
                            };
                            error!(
                                game_id = %game.id,
                                error = %err,
                                "post-transition scheduling failed"
                            );
                            return Err(err);
                        }
                    }
                    next
                }
            };
        }
    }

    async fn schedule(&self, game: Game) -> Result<Step, SchedulerError> {
        let task = &game.current_task;
        let mutator = self.policy.mutator(&game);
        let next_status = task.status.next();
        let job_id = TransitionJobId::for_task(task);

        if self.queue.get(&job_id).await?.is_some() {
            if task.status == TaskStatus::Active {
                info!(game_id = %game.id, job_id = %job_id, "fast-forwarding active stage");
                self.queue.remove(&job_id).await?;
                return Ok(Step::Transition {
                    game,
                    next_status,
                    mutator,
                });
            }
            info!(
                game_id = %game.id,
                job_id = %job_id,
                status = %task.status,
                "transition already scheduled"
            );
            return Ok(Step::Halt);
        }

        let delay = self.policy.delay(&game);
        let now = self.clock.now();
        let updated = self
            .store
            .load_mutate_save(game.id, &mut |g: &mut Game| {
                g.current_task.open_window(now, delay);
                Ok(())
            })
            .await?;

        if let Err(err) = self.publisher.publish(&updated).await {
            warn!(game_id = %updated.id, error = %err, "failed to publish transition window");
        }

        if delay.is_zero() {
            return Ok(Step::Transition {
                game: updated,
                next_status,
                mutator,
            });
        }

        let job = TransitionJob::snapshot(&updated);
        self.queue
            .add(job_id.clone(), job, delay, JobPriority::for_delay(delay))
            .await?;
        debug!(
            game_id = %updated.id,
            job_id = %job_id,
            delay_ms = duration_ms(delay),
            "transition job scheduled"
        );
        Ok(Step::Halt)
    }

    /// Applies the change only while the stored task is still the one `game`
    /// was read with (same task id and status).
    async fn transition(
        &self,
        game: &Game,
        next_status: Option<TaskStatus>,
        mutator: &StageMutator,
    ) -> Applied {
        let policy = &self.policy;
        let clock = &self.clock;
        let expected = &game.current_task;
        let mut superseded = false;
        let mut mutation = |g: &mut Game| -> Result<(), MutationError> {
            superseded =
                g.current_task.id != expected.id || g.current_task.status != expected.status;
            if superseded {
                return Ok(());
            }
            let before = g.current_task.task_type.clone();
            if let Some(status) = next_status {
                g.current_task.status = status;
            }
            mutator(g)?;
            if g.current_task.task_type != before {
                // new stage instance: its window starts now
                let delay = policy.delay(g);
                g.current_task.open_window(clock.now(), delay);
            }
            Ok(())
        };

        let persisted = match self.store.load_mutate_save(game.id, &mut mutation).await {
            Ok(persisted) => persisted,
            Err(err) => {
                error!(game_id = %game.id, error = %err, "failed to persist transition");
                return Applied::Failed;
            }
        };
        if superseded {
            warn!(
                game_id = %persisted.id,
                expected_task_id = %expected.id,
                expected_status = %expected.status,
                task_id = %persisted.current_task.id,
                status = %persisted.current_task.status,
                "stage changed before the transition applied; not continuing"
            );
            return Applied::Superseded;
        }
        if let Err(err) = self.publisher.publish(&persisted).await {
            error!(game_id = %persisted.id, error = %err, "failed to publish transition");
            return Applied::Failed;
        }

        let task = &persisted.current_task;
        debug!(
            game_id = %persisted.id,
            task_id = %task.id,
            task_type = %task.task_type,
            status = %task.status,
            "transition applied"
        );

        if let Some(requested) = next_status
            && task.status != requested
        {
            warn!(
                game_id = %persisted.id,
                requested = %requested,
                status = %task.status,
                "status changed concurrently; not continuing"
            );
            return Applied::Continue(Step::Halt);
        }
        if task.task_type == self.config.terminal_task_type {
            warn!(game_id = %persisted.id, task_type = %task.task_type, "terminal stage reached");
            return Applied::Continue(Step::Halt);
        }
        Applied::Continue(Step::PostTransition(persisted))
    }

    fn post_transition(&self, game: Game) -> Step {
        let delay = self.policy.delay(&game);
        let task = &game.current_task;
        if should_schedule_post_task_transition(&task.task_type, task.status, delay, &game.settings)
        {
            return Step::Schedule(game);
        }
        info!(
            game_id = %game.id,
            task_type = %task.task_type,
            status = %task.status,
            "stage waits for an external trigger"
        );
        Step::Halt
    }
}

fn duration_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
