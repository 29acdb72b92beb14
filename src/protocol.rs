//! Protocol messages for WebSocket communication

use serde::Serialize;

use crate::game::{Cell, Direction};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Direction change command
    Direction(Direction),
    /// Ping to keep connection alive
    Ping,
}

impl ClientMessage {
    /// Parse a client message from a string.
    ///
    /// Anything unrecognized yields `None`; keyboard input is uncontrolled,
    /// so unknown keys are dropped rather than treated as errors.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();

        if let Some(direction) = Direction::from_key(s) {
            return Some(ClientMessage::Direction(direction));
        }

        if s.eq_ignore_ascii_case("ping") {
            return Some(ClientMessage::Ping);
        }

        None
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Sent once when the session begins
    Start {
        size: u16,
        tick_ms: u64,
        snake: Vec<Cell>,
        food: Option<Cell>,
        score: u32,
    },
    /// State snapshot after a tick; snake cells are tail-to-head
    Update {
        snake: Vec<Cell>,
        food: Option<Cell>,
        score: u32,
        alive: bool,
    },
    /// The game ended; sent exactly once, with the final score
    Dead { score: u32 },
}

impl ServerMessage {
    /// Serialize message to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
