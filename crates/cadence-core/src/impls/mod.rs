//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryGameStore**: id ごとの mutex で直列化する正本
//! - **InMemoryDeferredQueue**: BinaryHeap + Notify の遅延ジョブキュー
//! - **BroadcastPublisher**: tokio broadcast による状態通知
//!
//! # 本番用実装
//! 本番用の実装（DB、外部ブローカー、WebSocket など）は別クレートに配置します。

pub mod broadcast_publisher;
pub mod inmem_deferred;
pub mod inmem_store;

// 主要な型を再エクスポート
pub use self::broadcast_publisher::BroadcastPublisher;
pub use self::inmem_deferred::{InMemoryDeferredQueue, QueueCounts};
pub use self::inmem_store::InMemoryGameStore;
