//! Post-transition decision: keep the game moving or wait for a trigger.

use std::time::Duration;

use super::{GameSettings, TaskStatus, TaskType};

/// Whether a freshly persisted stage should be scheduled again right away.
///
/// - `Pending` / `Completed`: always keep progressing.
/// - `Active`: only when the stage has a timer (`delay > 0`) or the game allows
///   this stage type to complete without one. Otherwise the stage stays open
///   until an external trigger arrives.
pub fn should_schedule_post_task_transition(
    task_type: &TaskType,
    status: TaskStatus,
    delay: Duration,
    settings: &GameSettings,
) -> bool {
    match status {
        TaskStatus::Pending | TaskStatus::Completed => true,
        TaskStatus::Active => !delay.is_zero() || settings.allows_auto_complete(task_type),
    }
}
