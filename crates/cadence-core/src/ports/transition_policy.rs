//! TransitionPolicy port - ステージの順序と長さを決めるドメインルール
//!
//! scheduler はステージの順番（lobby → question → …）を知りません。
//! 「次に何をするか」と「どれだけ待つか」はすべてここから受け取ります。

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Game, MutationError};

/// Advances or changes the current stage of a loaded game.
///
/// May leave the task untouched, or replace it with a new task of another
/// type (that is how the game moves to its next stage).
pub type StageMutator = Arc<dyn Fn(&mut Game) -> Result<(), MutationError> + Send + Sync>;

/// TransitionPolicy は純粋な判断のみ（副作用なし）
pub trait TransitionPolicy: Send + Sync {
    /// Mutator to run when the current stage transitions.
    fn mutator(&self, game: &Game) -> StageMutator;

    /// How long the current stage stays in its status before auto-advancing.
    fn delay(&self, game: &Game) -> Duration;
}
