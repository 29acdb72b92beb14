//! Game configuration constants and validated per-game parameters

use thiserror::Error;

use crate::game::board::{Board, BoardError};

/// Default board side length in cells
pub const DEFAULT_BOARD_SIZE: u16 = 11;

/// Smallest playable board side length
pub const MIN_BOARD_SIZE: u16 = 5;

/// Largest board side length a client may request
pub const MAX_BOARD_SIZE: u16 = 31;

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 250;

/// Fastest tick interval a client may request
pub const MIN_TICK_MS: u64 = 50;

/// Slowest tick interval a client may request
pub const MAX_TICK_MS: u64 = 1000;

/// Snake length at the start of every game (excluded from scoring)
pub const INITIAL_SNAKE_LENGTH: usize = 3;

/// WebSocket server port
pub const SERVER_PORT: u16 = 8080;

/// Snapshot broadcast channel capacity per session
pub const UPDATE_CAPACITY: usize = 64;

/// Direction command buffer capacity per session
pub const COMMAND_CAPACITY: usize = 16;

// =============================================================================
// Input throttling
// =============================================================================

/// Maximum direction commands per throttle window
pub const MAX_COMMANDS_PER_WINDOW: u32 = 15;

/// Throttle window length in milliseconds
pub const THROTTLE_WINDOW_MS: u64 = 1000;

/// Number of throttle violations before the connection is closed
pub const MAX_THROTTLE_VIOLATIONS: u32 = 3;

// =============================================================================
// Event logging
// =============================================================================

/// Enable game event logging
pub const ENABLE_EVENT_LOGGING: bool = true;

/// Log file path
pub const EVENT_LOG_FILE: &str = "game_events.log";

/// Invalid per-game parameters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("tick interval {0}ms out of range {MIN_TICK_MS}..={MAX_TICK_MS}")]
    TickOutOfRange(u64),
}

/// Validated parameters for one game session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub board: Board,
    pub tick_ms: u64,
}

impl GameConfig {
    /// Validate client-supplied board size and tick interval
    pub fn new(board_size: u16, tick_ms: u64) -> Result<Self, ConfigError> {
        let board = Board::new(board_size)?;

        if !(MIN_TICK_MS..=MAX_TICK_MS).contains(&tick_ms) {
            return Err(ConfigError::TickOutOfRange(tick_ms));
        }

        Ok(Self { board, tick_ms })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: Board::new(DEFAULT_BOARD_SIZE).expect("default board size is valid"),
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}
