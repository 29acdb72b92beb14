//! Application state shared across all handlers

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::event_logger::EventLogger;
use crate::session::{GameOverHook, GameSummary};

/// Registry entry for one live connection
#[derive(Debug, Clone, Copy)]
pub struct SessionInfo {
    pub board_size: u16,
    pub started: Instant,
    /// Set once the game ends; the connection may outlive the game
    pub final_score: Option<u32>,
}

/// Shared application state
pub struct AppState {
    /// All live sessions, keyed by connection UUID
    pub sessions: DashMap<Uuid, SessionInfo>,
    /// Event logger for replay/analysis
    pub event_logger: Arc<EventLogger>,
}

impl AppState {
    /// Create a new application state
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            event_logger: Arc::new(EventLogger::new()),
        }
    }

    /// Number of live connections
    pub fn player_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameOverHook for AppState {
    async fn on_game_over(&self, summary: GameSummary) {
        if let Some(mut info) = self.sessions.get_mut(&summary.session_id) {
            info.final_score = Some(summary.score);
        }
    }
}
