//! Game module: grid geometry, directions, and the tick simulation

pub mod board;
pub mod direction;
pub mod simulation;

pub use board::{Board, Cell};
pub use direction::Direction;
pub use simulation::Simulation;
