//! InMemoryGameStore - テスト・デモ用の正本
//!
//! # 実装詳細
//! - HashMap<GameId, Arc<tokio::sync::Mutex<Game>>> で id ごとにロック（悲観ロック）
//! - mutation はクローンに対して実行し、Ok のときだけ書き戻す

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Mutex as GameLock;

use crate::domain::{Game, GameId, StoreError};
use crate::ports::{GameMutation, GameStore};

#[derive(Debug, Default)]
pub struct InMemoryGameStore {
    games: Mutex<HashMap<GameId, Arc<GameLock<Game>>>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a game.
    pub fn insert(&self, game: Game) {
        let mut games = self.games.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        games.insert(game.id, Arc::new(GameLock::new(game)));
    }

    fn slot(&self, id: GameId) -> Result<Arc<GameLock<Game>>, StoreError> {
        let games = self.games.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        games.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }
}

#[async_trait]
impl GameStore for InMemoryGameStore {
    async fn load_mutate_save(
        &self,
        id: GameId,
        mutation: &mut GameMutation<'_>,
    ) -> Result<Game, StoreError> {
        let slot = self.slot(id)?;
        let mut current = slot.lock().await;

        let mut draft = current.clone();
        mutation(&mut draft)?;
        *current = draft.clone();

        Ok(draft)
    }

    async fn load_by_id(&self, id: GameId) -> Result<Game, StoreError> {
        let slot = self.slot(id)?;
        let game = slot.lock().await;
        Ok(game.clone())
    }
}
