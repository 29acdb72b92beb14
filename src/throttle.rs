//! Sliding-window throttle for client direction input

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::{MAX_COMMANDS_PER_WINDOW, MAX_THROTTLE_VIOLATIONS, THROTTLE_WINDOW_MS};

/// Verdict for one inbound command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admit {
    /// Forward the command to the session
    Allowed,
    /// Over the window limit; drop the command
    Dropped,
    /// Too many violations; close the connection
    Kick,
}

/// Per-connection command throttle.
///
/// Keyboard autorepeat and scripted spam can flood direction changes far
/// faster than one per tick; commands above the window limit are dropped,
/// and repeated flooding closes the connection.
#[derive(Debug)]
pub struct InputThrottle {
    command_times: VecDeque<Instant>,
    violations: u32,
}

impl Default for InputThrottle {
    fn default() -> Self {
        Self::new()
    }
}

impl InputThrottle {
    pub fn new() -> Self {
        Self {
            command_times: VecDeque::with_capacity(MAX_COMMANDS_PER_WINDOW as usize + 1),
            violations: 0,
        }
    }

    /// Judge a command arriving now
    pub fn admit(&mut self) -> Admit {
        self.admit_at(Instant::now())
    }

    fn admit_at(&mut self, now: Instant) -> Admit {
        let window_start = now - Duration::from_millis(THROTTLE_WINDOW_MS);

        while let Some(front) = self.command_times.front() {
            if *front < window_start {
                self.command_times.pop_front();
            } else {
                break;
            }
        }

        if self.command_times.len() < MAX_COMMANDS_PER_WINDOW as usize {
            self.command_times.push_back(now);
            return Admit::Allowed;
        }

        self.violations += 1;
        if self.violations >= MAX_THROTTLE_VIOLATIONS {
            Admit::Kick
        } else {
            Admit::Dropped
        }
    }

    /// Violations so far on this connection
    pub fn violations(&self) -> u32 {
        self.violations
    }
}
