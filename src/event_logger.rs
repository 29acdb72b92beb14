//! Game event logging (JSON lines) for post-game analysis

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{ENABLE_EVENT_LOGGING, EVENT_LOG_FILE};
use crate::game::board::Cell;
use crate::game::simulation::Collision;

/// Types of game events that can be logged
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A game session began
    SessionStarted {
        session_id: String,
        board_size: u16,
        tick_ms: u64,
    },
    /// The snake ate the food
    FoodEaten {
        session_id: String,
        cell: Cell,
        score: u32,
    },
    /// The game reached its terminal state
    GameOver {
        session_id: String,
        score: u32,
        cause: String,
        ticks: u64,
    },
    /// The client flooded direction commands and was disconnected
    ClientThrottled {
        session_id: String,
        violations: u32,
    },
    /// The connection closed
    SessionClosed { session_id: String },
}

/// Logged event with timestamp
#[derive(Debug, Serialize)]
struct LogEntry {
    /// Unix timestamp in milliseconds
    timestamp_ms: u128,
    /// The event data
    #[serde(flatten)]
    event: GameEvent,
}

/// Game event logger
pub struct EventLogger {
    /// File writer (None if logging disabled)
    writer: Option<Mutex<BufWriter<File>>>,
    enabled: bool,
}

impl EventLogger {
    /// Create a new event logger
    pub fn new() -> Self {
        if !ENABLE_EVENT_LOGGING {
            info!("Event logging is disabled");
            return Self {
                writer: None,
                enabled: false,
            };
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(EVENT_LOG_FILE)
        {
            Ok(file) => {
                info!("Event logging enabled, writing to {}", EVENT_LOG_FILE);
                Self {
                    writer: Some(Mutex::new(BufWriter::new(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to open event log file: {}", e);
                Self {
                    writer: None,
                    enabled: false,
                }
            }
        }
    }

    /// Create a logger that discards everything; tests use this so the
    /// suite leaves no log file behind
    pub fn disabled() -> Self {
        Self {
            writer: None,
            enabled: false,
        }
    }

    /// Log a game event
    pub fn log(&self, event: GameEvent) {
        if !self.enabled {
            return;
        }

        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let entry = LogEntry {
            timestamp_ms,
            event,
        };

        if let Some(ref writer) = self.writer {
            if let Ok(mut w) = writer.lock() {
                if let Ok(json) = serde_json::to_string(&entry) {
                    let _ = writeln!(w, "{}", json);
                    let _ = w.flush();
                }
            }
        }
    }

    /// Log session start
    pub fn log_session_started(&self, session_id: Uuid, board_size: u16, tick_ms: u64) {
        self.log(GameEvent::SessionStarted {
            session_id: session_id.to_string(),
            board_size,
            tick_ms,
        });
    }

    /// Log food eaten
    pub fn log_food_eaten(&self, session_id: Uuid, cell: Cell, score: u32) {
        self.log(GameEvent::FoodEaten {
            session_id: session_id.to_string(),
            cell,
            score,
        });
    }

    /// Log game over
    pub fn log_game_over(&self, session_id: Uuid, score: u32, cause: Collision, ticks: u64) {
        self.log(GameEvent::GameOver {
            session_id: session_id.to_string(),
            score,
            cause: cause.label().to_string(),
            ticks,
        });
    }

    /// Log a throttle kick
    pub fn log_client_throttled(&self, session_id: Uuid, violations: u32) {
        self.log(GameEvent::ClientThrottled {
            session_id: session_id.to_string(),
            violations,
        });
    }

    /// Log session close
    pub fn log_session_closed(&self, session_id: Uuid) {
        self.log(GameEvent::SessionClosed {
            session_id: session_id.to_string(),
        });
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new()
    }
}
