//! Test fixtures shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::app::{Scheduler, SchedulerBuilder};
use crate::config::SchedulerConfig;
use crate::domain::{
    Game, GameId, GameSettings, JobPriority, MutationError, Participant, ParticipantId,
    PublishError, QueueError, StoreError, Task, TaskId, TaskStatus, TaskType, TransitionJob,
    TransitionJobId,
};
use crate::impls::{InMemoryDeferredQueue, InMemoryGameStore};
use crate::ports::{
    DeferredJobQueue, EventPublisher, FixedClock, GameMutation, GameStore, StageMutator,
    TransitionPolicy,
};

pub(crate) fn game_on(task_type: &str, status: TaskStatus) -> Game {
    let mut task = Task::new(TaskId::generate(), TaskType::new(task_type), serde_json::json!({}));
    task.status = status;
    let mut game = Game::new(GameId::generate(), GameSettings::default(), task);
    game.join(Participant {
        id: ParticipantId::generate(),
        nickname: "ferris".into(),
    });
    game
}

pub(crate) fn lobby_game() -> Game {
    game_on("lobby", TaskStatus::Pending)
}

/// Policy driven by a fixed stage list.
///
/// A completed stage advances to the next type in the list; every other
/// status keeps the stage as is. Delays default to zero.
pub(crate) struct ScriptedPolicy {
    stages: Vec<TaskType>,
    delays: HashMap<(TaskType, TaskStatus), Duration>,
    mutator: Option<StageMutator>,
}

impl ScriptedPolicy {
    pub(crate) fn new<const N: usize>(stages: [&str; N]) -> Self {
        Self {
            stages: stages.into_iter().map(TaskType::new).collect(),
            delays: HashMap::new(),
            mutator: None,
        }
    }

    pub(crate) fn with_delay(
        mut self,
        task_type: &str,
        status: TaskStatus,
        delay: Duration,
    ) -> Self {
        self.delays.insert((TaskType::new(task_type), status), delay);
        self
    }

    /// Use `mutator` for every stage instead of the list-driven one.
    pub(crate) fn with_mutator<F>(mut self, mutator: F) -> Self
    where
        F: Fn(&mut Game) -> Result<(), MutationError> + Send + Sync + 'static,
    {
        self.mutator = Some(Arc::new(mutator));
        self
    }

    fn stage_after(&self, current: &TaskType) -> Option<TaskType> {
        let position = self.stages.iter().position(|stage| stage == current)?;
        self.stages.get(position + 1).cloned()
    }
}

impl TransitionPolicy for ScriptedPolicy {
    fn mutator(&self, game: &Game) -> StageMutator {
        if let Some(mutator) = &self.mutator {
            return Arc::clone(mutator);
        }
        if game.current_task.status != TaskStatus::Completed {
            return Arc::new(|_: &mut Game| Ok(()));
        }
        match self.stage_after(&game.current_task.task_type) {
            Some(next) => Arc::new(move |g: &mut Game| {
                g.advance_to(Task::new(TaskId::generate(), next.clone(), serde_json::json!({})));
                Ok(())
            }),
            None => Arc::new(|_: &mut Game| {
                Err(MutationError::Policy("no stage after the last one".into()))
            }),
        }
    }

    fn delay(&self, game: &Game) -> Duration {
        let task = &game.current_task;
        self.delays
            .get(&(task.task_type.clone(), task.status))
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

/// In-memory store whose saves can be made to fail, and whose next read can
/// be made to lag behind the stored state.
#[derive(Default)]
pub(crate) struct FlakyStore {
    inner: InMemoryGameStore,
    fail_saves: AtomicBool,
    lagging_read: Mutex<Option<Game>>,
}

impl FlakyStore {
    pub(crate) fn insert(&self, game: Game) {
        self.inner.insert(game);
    }

    pub(crate) fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The next `load_by_id` returns `seen` instead of what is stored.
    pub(crate) fn lag_next_read(&self, seen: Game) {
        *self.lagging_read.lock().unwrap() = Some(seen);
    }
}

#[async_trait]
impl GameStore for FlakyStore {
    async fn load_mutate_save(
        &self,
        id: GameId,
        mutation: &mut GameMutation<'_>,
    ) -> Result<Game, StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            let cause =
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
            return Err(StoreError::unavailable("save failed", cause));
        }
        self.inner.load_mutate_save(id, mutation).await
    }

    async fn load_by_id(&self, id: GameId) -> Result<Game, StoreError> {
        let lagging = self.lagging_read.lock().unwrap().take();
        match lagging {
            Some(seen) => Ok(seen),
            None => self.inner.load_by_id(id).await,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedAdd {
    pub id: TransitionJobId,
    pub job: TransitionJob,
    pub delay: Duration,
    pub priority: JobPriority,
}

/// Deferred queue that remembers every successful `add`.
#[derive(Default)]
pub(crate) struct RecordingQueue {
    pub inner: InMemoryDeferredQueue,
    adds: Mutex<Vec<RecordedAdd>>,
}

impl RecordingQueue {
    pub(crate) fn adds(&self) -> Vec<RecordedAdd> {
        self.adds.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeferredJobQueue for RecordingQueue {
    async fn add(
        &self,
        id: TransitionJobId,
        job: TransitionJob,
        delay: Duration,
        priority: JobPriority,
    ) -> Result<(), QueueError> {
        self.inner.add(id.clone(), job.clone(), delay, priority).await?;
        self.adds.lock().unwrap().push(RecordedAdd {
            id,
            job,
            delay,
            priority,
        });
        Ok(())
    }

    async fn get(&self, id: &TransitionJobId) -> Result<Option<TransitionJob>, QueueError> {
        self.inner.get(id).await
    }

    async fn remove(&self, id: &TransitionJobId) -> Result<(), QueueError> {
        self.inner.remove(id).await
    }
}

/// Deferred queue that accepts every `add`, even for an id it already holds.
#[derive(Default)]
pub(crate) struct AppendingQueue {
    jobs: Mutex<Vec<(TransitionJobId, TransitionJob)>>,
}

impl AppendingQueue {
    pub(crate) fn jobs(&self) -> Vec<(TransitionJobId, TransitionJob)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeferredJobQueue for AppendingQueue {
    async fn add(
        &self,
        id: TransitionJobId,
        job: TransitionJob,
        _delay: Duration,
        _priority: JobPriority,
    ) -> Result<(), QueueError> {
        self.jobs.lock().unwrap().push((id, job));
        Ok(())
    }

    async fn get(&self, id: &TransitionJobId) -> Result<Option<TransitionJob>, QueueError> {
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs.iter().find(|(held, _)| held == id).map(|(_, job)| job.clone()))
    }

    async fn remove(&self, id: &TransitionJobId) -> Result<(), QueueError> {
        self.jobs.lock().unwrap().retain(|(held, _)| held != id);
        Ok(())
    }
}

/// Publisher that keeps every published state (and can be told to fail).
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    published: Mutex<Vec<Game>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub(crate) fn published(&self) -> Vec<Game> {
        self.published.lock().unwrap().clone()
    }

    pub(crate) fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, game: &Game) -> Result<(), PublishError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublishError::Rejected("subscriber gone".into()));
        }
        self.published.lock().unwrap().push(game.clone());
        Ok(())
    }
}

/// A scheduler wired to recording fakes and a frozen clock.
pub(crate) struct Harness {
    pub store: Arc<FlakyStore>,
    pub queue: Arc<RecordingQueue>,
    pub publisher: Arc<RecordingPublisher>,
    pub policy: Arc<ScriptedPolicy>,
    pub clock: Arc<FixedClock>,
    pub scheduler: Scheduler,
}

impl Harness {
    pub(crate) fn new(policy: ScriptedPolicy) -> Self {
        Self::with_config(policy, SchedulerConfig::default())
    }

    pub(crate) fn with_config(policy: ScriptedPolicy, config: SchedulerConfig) -> Self {
        let store = Arc::new(FlakyStore::default());
        let queue = Arc::new(RecordingQueue::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let policy = Arc::new(policy);
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        ));

        let scheduler = SchedulerBuilder::new()
            .store(store.clone())
            .queue(queue.clone())
            .publisher(publisher.clone())
            .policy(policy.clone())
            .clock(clock.clone())
            .config(config)
            .build()
            .unwrap();

        Self {
            store,
            queue,
            publisher,
            policy,
            clock,
            scheduler,
        }
    }

    /// A second scheduler over the same store, publisher, policy and clock.
    pub(crate) fn scheduler_with_queue(&self, queue: Arc<dyn DeferredJobQueue>) -> Scheduler {
        SchedulerBuilder::new()
            .store(self.store.clone())
            .queue(queue)
            .publisher(self.publisher.clone())
            .policy(self.policy.clone())
            .clock(self.clock.clone())
            .build()
            .unwrap()
    }

    pub(crate) fn insert(&self, game: Game) -> Game {
        self.store.insert(game.clone());
        game
    }
}
