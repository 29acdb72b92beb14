//! Per-connection game session
//!
//! Each WebSocket connection owns one simulation, driven by a dedicated
//! tokio task with a fixed-interval clock. The task multiplexes clock ticks
//! and direction commands, so exactly one tick executes at a time and a
//! direction request is applied atomically at the start of the next tick.
//! The task exits, dropping its clock, when the game ends or the client
//! goes away.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{GameConfig, COMMAND_CAPACITY, UPDATE_CAPACITY};
use crate::event_logger::EventLogger;
use crate::game::simulation::{Collision, TickOutcome};
use crate::game::{Direction, Simulation};
use crate::protocol::ServerMessage;

/// Final figures for one finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub session_id: Uuid,
    pub score: u32,
    pub ticks: u64,
    pub cause: Collision,
}

/// Invoked exactly once when a game reaches its terminal state
#[async_trait]
pub trait GameOverHook: Send + Sync {
    async fn on_game_over(&self, summary: GameSummary);
}

/// Handles for talking to a running session task
pub struct Session {
    /// Direction input; the simulation buffers these into one pending value
    pub commands: mpsc::Sender<Direction>,
    /// State snapshot feed, one `Update` per tick
    pub updates: broadcast::Receiver<Arc<ServerMessage>>,
}

/// Spawn the session task and hand back its channels
pub fn spawn_session(
    session_id: Uuid,
    config: GameConfig,
    events: Arc<EventLogger>,
    hook: Arc<dyn GameOverHook>,
) -> Session {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (update_tx, update_rx) = broadcast::channel(UPDATE_CAPACITY);

    tokio::spawn(run_session(
        session_id, config, events, hook, command_rx, update_tx,
    ));

    Session {
        commands: command_tx,
        updates: update_rx,
    }
}

async fn run_session(
    session_id: Uuid,
    config: GameConfig,
    events: Arc<EventLogger>,
    hook: Arc<dyn GameOverHook>,
    mut commands: mpsc::Receiver<Direction>,
    updates: broadcast::Sender<Arc<ServerMessage>>,
) {
    let mut sim = Simulation::new(config.board);
    let mut clock = interval(Duration::from_millis(config.tick_ms));
    // The first interval fire is immediate; consume it so the first move
    // lands one full period after the start message
    clock.tick().await;

    events.log_session_started(session_id, config.board.size(), config.tick_ms);
    publish(
        &updates,
        ServerMessage::Start {
            size: config.board.size(),
            tick_ms: config.tick_ms,
            snake: sim.cells(),
            food: sim.food(),
            score: sim.score(),
        },
    );

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            _ = clock.tick() => {
                ticks += 1;
                match sim.tick() {
                    TickOutcome::Moved => {
                        publish(&updates, snapshot(&sim));
                    }
                    TickOutcome::Ate => {
                        debug!(%session_id, score = sim.score(), "food eaten");
                        events.log_food_eaten(session_id, sim.head(), sim.score());
                        publish(&updates, snapshot(&sim));
                    }
                    TickOutcome::Died(cause) => {
                        let score = sim.score();
                        info!(%session_id, score, cause = cause.label(), ticks, "game over");
                        publish(&updates, snapshot(&sim));
                        publish(&updates, ServerMessage::Dead { score });
                        events.log_game_over(session_id, score, cause, ticks);
                        hook.on_game_over(GameSummary { session_id, score, ticks, cause }).await;
                        break;
                    }
                    TickOutcome::Idle => break,
                }
            }
            command = commands.recv() => match command {
                Some(direction) => {
                    if !sim.request_direction(direction) {
                        debug!(%session_id, ?direction, "direction request rejected");
                    }
                }
                None => {
                    debug!(%session_id, "client gone, stopping session clock");
                    break;
                }
            }
        }
    }
}

fn snapshot(sim: &Simulation) -> ServerMessage {
    ServerMessage::Update {
        snake: sim.cells(),
        food: sim.food(),
        score: sim.score(),
        alive: sim.is_alive(),
    }
}

fn publish(updates: &broadcast::Sender<Arc<ServerMessage>>, msg: ServerMessage) {
    // send() errors when nobody is subscribed anymore, which is fine
    if let Err(e) = updates.send(Arc::new(msg)) {
        debug!("snapshot publish (no receivers): {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct RecordingHook {
        calls: AtomicU32,
        last: Mutex<Option<GameSummary>>,
    }

    impl RecordingHook {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                last: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl GameOverHook for RecordingHook {
        async fn on_game_over(&self, summary: GameSummary) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(summary);
        }
    }

    fn test_session(hook: Arc<dyn GameOverHook>) -> Session {
        let config = GameConfig::new(11, 50).unwrap();
        spawn_session(Uuid::new_v4(), config, Arc::new(EventLogger::disabled()), hook)
    }

    async fn drain_until_dead(session: &mut Session) -> Vec<Arc<ServerMessage>> {
        let mut messages = Vec::new();
        loop {
            let msg = session.updates.recv().await.expect("feed closed early");
            let is_dead = matches!(msg.as_ref(), ServerMessage::Dead { .. });
            messages.push(msg);
            if is_dead {
                return messages;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_into_wall_and_reports_once() {
        let hook = RecordingHook::new();
        let mut session = test_session(hook.clone());

        let messages = drain_until_dead(&mut session).await;

        // Start, 8 moves along the top row, the terminal update, then Dead
        assert!(matches!(messages[0].as_ref(), ServerMessage::Start { .. }));
        assert!(matches!(
            messages[messages.len() - 2].as_ref(),
            ServerMessage::Update { alive: false, .. }
        ));
        assert!(matches!(
            messages.last().unwrap().as_ref(),
            ServerMessage::Dead { score: 0 }
        ));

        // The feed closes after Dead: the clock was stopped exactly once
        assert!(session.updates.recv().await.is_err());

        assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
        let summary = hook.last.lock().unwrap().expect("hook recorded a summary");
        assert_eq!(summary.score, 0);
        assert_eq!(summary.cause, Collision::Wall);
    }

    #[tokio::test(start_paused = true)]
    async fn test_direction_command_applies_at_next_tick() {
        let hook = RecordingHook::new();
        let mut session = test_session(hook);

        let start = session.updates.recv().await.unwrap();
        assert!(matches!(start.as_ref(), ServerMessage::Start { .. }));

        session.commands.send(Direction::Down).await.unwrap();

        let first = session.updates.recv().await.unwrap();
        match first.as_ref() {
            ServerMessage::Update { snake, .. } => assert_eq!(snake, &vec![1, 2, 13]),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_stops_session_without_game_over() {
        let hook = RecordingHook::new();
        let mut session = test_session(hook.clone());

        drop(session.commands);

        // No Dead message appears before the feed closes
        loop {
            match session.updates.recv().await {
                Ok(msg) => assert!(!matches!(msg.as_ref(), ServerMessage::Dead { .. })),
                Err(_) => break,
            }
        }
        assert_eq!(hook.calls.load(Ordering::SeqCst), 0);
    }
}
