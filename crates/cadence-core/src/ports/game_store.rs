//! GameStore port - ゲーム集約の正本（source of truth）
//!
//! 実装は悲観ロック（id ごとの mutex）でも楽観ロック（CAS + リトライ）でも構いません。
//! 条件は「load → mutate → save」が同じ id に対して原子的であることだけです。

use async_trait::async_trait;

use crate::domain::{Game, GameId, MutationError, StoreError};

/// In-place change applied to a loaded game.
///
/// `FnMut` so that optimistic implementations can re-run it after a conflict.
pub type GameMutation<'a> = dyn FnMut(&mut Game) -> Result<(), MutationError> + Send + 'a;

/// GameStore は Game 集約を保持
///
/// # 設計原則
/// - 同じ game id への mutation は直列化される
/// - mutation が Err を返したら何も保存しない
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Load the game, apply `mutation`, persist and return the saved state.
    async fn load_mutate_save(
        &self,
        id: GameId,
        mutation: &mut GameMutation<'_>,
    ) -> Result<Game, StoreError>;

    /// Plain read. `StoreError::NotFound` when the id is unknown.
    async fn load_by_id(&self, id: GameId) -> Result<Game, StoreError>;
}
