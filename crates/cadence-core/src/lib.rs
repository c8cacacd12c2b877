//! cadence-core
//!
//! Core building blocks for driving staged multiplayer games
//! (lobby → question → result → … → podium) through timed transitions.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, status, task, game, job, cascade, errors）
//! - **ports**: 抽象化レイヤー（GameStore, DeferredJobQueue, EventPublisher, TransitionPolicy, など）
//! - **app**: アプリケーションロジック（builder, scheduler, worker）
//! - **impls**: 実装（InMemoryGameStore, InMemoryDeferredQueue など開発用）
//! - **config**: SchedulerConfig の読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

#[cfg(test)]
mod testing;
