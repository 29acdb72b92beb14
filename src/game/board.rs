//! Board geometry: a square grid addressed by flat row-major indices

use thiserror::Error;

use super::direction::Direction;
use crate::config::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};

/// A single grid cell, as a row-major index in `0..size²`
pub type Cell = u16;

/// Invalid board dimensions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board side {0} must be odd")]
    EvenSide(u16),
    #[error("board side {0} out of range {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}")]
    SideOutOfRange(u16),
}

/// A square grid of odd side length, fixed for the lifetime of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    size: u16,
}

impl Board {
    /// Create a board, failing fast on unplayable dimensions
    pub fn new(size: u16) -> Result<Self, BoardError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(BoardError::SideOutOfRange(size));
        }
        if size % 2 == 0 {
            return Err(BoardError::EvenSide(size));
        }
        Ok(Self { size })
    }

    /// Side length in cells
    pub fn size(&self) -> u16 {
        self.size
    }

    /// Total number of cells (`size²`)
    pub fn cells(&self) -> u16 {
        self.size * self.size
    }

    /// Row of a cell in the row-major layout
    pub fn row(&self, cell: Cell) -> u16 {
        cell / self.size
    }

    /// The center cell, where the first food spawns
    pub fn center(&self) -> Cell {
        self.cells() / 2
    }

    /// Signed index offset of one step in the given direction
    pub fn delta(&self, direction: Direction) -> i32 {
        match direction {
            Direction::Up => -i32::from(self.size),
            Direction::Down => i32::from(self.size),
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}
