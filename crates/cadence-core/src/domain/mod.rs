//! Domain model: games, stages, statuses, deferred jobs and errors.
//!
//! ここには I/O を持たない型と純粋関数だけを置きます。
//! 永続化・配送・通知は `ports` 側の責務です。

pub mod cascade;
pub mod errors;
pub mod game;
pub mod ids;
pub mod job;
pub mod status;
pub mod task;

pub use self::cascade::should_schedule_post_task_transition;
pub use self::errors::{MutationError, PublishError, QueueError, SchedulerError, StoreError};
pub use self::game::{Game, GameSettings, Participant};
pub use self::ids::{GameId, ParticipantId, TaskId};
pub use self::job::{JobOutcome, JobPriority, TransitionJob, TransitionJobId};
pub use self::status::TaskStatus;
pub use self::task::{Task, TaskType};
