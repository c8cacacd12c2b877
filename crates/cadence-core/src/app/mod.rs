//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **SchedulerBuilder**: Scheduler の構築とワイヤリング
//! - **Scheduler**: 遷移のスケジューリングと発火ジョブの処理
//! - **WorkerGroup**: 発火したジョブを Scheduler に流すワーカー群

pub mod builder;
pub mod scheduler;
pub mod worker;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, SchedulerBuilder};
pub use self::scheduler::Scheduler;
pub use self::worker::WorkerGroup;
