//! Cadence demo: plays one quiz game through every stage with in-memory adapters.
//!
//! Usage: `cadence-cli [QUESTIONS]` (default 3). `RUST_LOG` controls log output,
//! `CADENCE_CONFIG_PATH` points to the scheduler config.

use std::env;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cadence_core::app::{SchedulerBuilder, WorkerGroup};
use cadence_core::config::SchedulerConfig;
use cadence_core::domain::{Game, GameSettings, Participant};
use cadence_core::impls::{BroadcastPublisher, InMemoryDeferredQueue, InMemoryGameStore};
use cadence_core::ports::{IdGenerator, SystemClock, UlidGenerator};

mod quiz;

use quiz::{QuizPolicy, QuizTimings};

const DEFAULT_QUESTIONS: usize = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let questions = match env::args().nth(1) {
        Some(arg) => arg
            .parse::<usize>()
            .with_context(|| format!("QUESTIONS must be a number, got `{arg}`"))?,
        None => DEFAULT_QUESTIONS,
    };
    let config = SchedulerConfig::load();

    let ids: Arc<dyn IdGenerator> = Arc::new(UlidGenerator::new(SystemClock));
    let store = Arc::new(InMemoryGameStore::new());
    let queue = Arc::new(InMemoryDeferredQueue::new());
    let publisher = Arc::new(BroadcastPublisher::new(256));
    let policy = Arc::new(QuizPolicy::new(questions, QuizTimings::default(), Arc::clone(&ids)));

    let scheduler = Arc::new(
        SchedulerBuilder::new()
            .store(store.clone())
            .queue(queue.clone())
            .publisher(publisher.clone())
            .policy(policy.clone())
            .config(config.clone())
            .build()
            .context("wiring scheduler")?,
    );
    let workers = WorkerGroup::spawn(config.workers, queue.clone(), Arc::clone(&scheduler));

    let mut game = Game::new(ids.generate_game_id(), GameSettings::default(), policy.first_stage());
    for nickname in ["ferris", "corro"] {
        game.join(Participant {
            id: ids.generate_participant_id(),
            nickname: nickname.to_string(),
        });
    }
    store.insert(game.clone());
    info!(game_id = %game.id, questions, "starting quiz");

    let mut updates = publisher.subscribe();
    scheduler
        .schedule_task_transition(&game)
        .await
        .context("starting the first stage")?;

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(state) => {
                    print_stage(&state);
                    if state.current_task.task_type == config.terminal_task_type {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "stage printer fell behind");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    workers.shutdown_and_join().await;
    queue.close().await;
    info!(pending = ?queue.counts().await, "quiz finished");

    Ok(())
}

fn print_stage(game: &Game) {
    let task = &game.current_task;
    let remaining = task
        .transition_expires
        .map(|expires| (expires - Utc::now()).num_milliseconds().max(0))
        .unwrap_or(0);
    println!(
        "[{}] {:<16} {:<9} round={} next in {}ms",
        game.id,
        task.task_type,
        task.status,
        game.previous_tasks.len(),
        remaining,
    );
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,cadence_core=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
