//! Domain identifiers (strongly-typed IDs).
//!
//! ULID ベースの ID を Phantom type パターンで型付けしています。
//! `GameId` と `TaskId` は実行時には同じ 16 byte ですが、コンパイル時に混同できません。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: timestamp が先頭にあるため、生成順序でソートできる
//! - **分散生成可能**: 調整なしで複数ノードで生成できる

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"game-", "task-", "participant-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData なのでメモリを消費しません。
#[repr(transparent)]
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

// derive(Clone, Copy) would require `T: Clone + Copy` on the marker.
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// Fresh id from the system clock. Prefer an [`IdGenerator`](crate::ports::IdGenerator)
    /// when the timestamp part must be deterministic.
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Game のマーカー型
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Game {}

impl IdMarker for Game {
    fn prefix() -> &'static str {
        "game-"
    }
}

/// Task（ステージ）のマーカー型
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

/// Participant のマーカー型
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Participant {}

impl IdMarker for Participant {
    fn prefix() -> &'static str {
        "participant-"
    }
}

/// Identifier of a Game (the aggregate root).
pub type GameId = Id<Game>;

/// Identifier of one stage instance inside a game.
pub type TaskId = Id<Task>;

/// Identifier of a player taking part in a game.
pub type ParticipantId = Id<Participant>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let ulid1 = Ulid::new();
        let ulid2 = Ulid::new();
        let ulid3 = Ulid::new();

        let game = GameId::from_ulid(ulid1);
        let task = TaskId::from_ulid(ulid2);
        let participant = ParticipantId::from_ulid(ulid3);

        assert_eq!(game.as_ulid(), ulid1);
        assert_eq!(task.as_ulid(), ulid2);
        assert_eq!(participant.as_ulid(), ulid3);

        assert!(game.to_string().starts_with("game-"));
        assert!(task.to_string().starts_with("task-"));
        assert!(participant.to_string().starts_with("participant-"));

        // let _: GameId = task; // <- does not compile
    }

    #[test]
    fn ids_serialize_as_bare_ulid() {
        let ulid = Ulid::new();
        let task_id = TaskId::from_ulid(ulid);

        let serialized = serde_json::to_string(&task_id).unwrap();
        assert_eq!(serialized, format!("\"{ulid}\""));

        let deserialized: TaskId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(task_id, deserialized);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;

        assert_eq!(size_of::<GameId>(), size_of::<Ulid>());
        assert_eq!(size_of::<TaskId>(), size_of::<Ulid>());
        assert_eq!(size_of::<ParticipantId>(), 16);
    }
}
