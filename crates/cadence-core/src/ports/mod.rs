//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! scheduler はこれらの trait だけに依存し、実装の詳細（DB、ブローカー、
//! 通知チャネル）を知りません。開発・テスト用の実装は `impls` にあります。

pub mod clock;
pub mod deferred_queue;
pub mod event_publisher;
pub mod game_store;
pub mod id_generator;
pub mod transition_policy;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::deferred_queue::{DeferredJobQueue, FiredJobSource};
pub use self::event_publisher::EventPublisher;
pub use self::game_store::{GameMutation, GameStore};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::transition_policy::{StageMutator, TransitionPolicy};
