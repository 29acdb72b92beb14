//! The simulation engine: one tick advances the snake by one cell
//!
//! The snake is an ordered sequence of cell indices, tail at the front of
//! the deque and head at the back. Direction input is buffered into at most
//! one pending value and applied at the start of the next tick, so several
//! key presses within one tick window cannot corrupt the reversal check.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::board::{Board, Cell};
use super::direction::Direction;
use crate::config::INITIAL_SNAKE_LENGTH;

/// What the snake ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Board edge, including a horizontal move wrapping across a row boundary
    Wall,
    /// A cell already occupied by the snake's own body
    SelfBite,
}

impl Collision {
    /// Stable label for event logs
    pub fn label(&self) -> &'static str {
        match self {
            Collision::Wall => "wall",
            Collision::SelfBite => "self_bite",
        }
    }
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The snake advanced one cell
    Moved,
    /// The snake advanced onto the food and grew
    Ate,
    /// The move was fatal; the simulation is now terminal
    Died(Collision),
    /// The simulation was already terminal; nothing happened
    Idle,
}

/// One game's state: snake, food, facing direction, and liveness
pub struct Simulation {
    board: Board,
    /// Body cells, tail first, head last
    snake: VecDeque<Cell>,
    /// `None` only once the snake fills the whole board
    food: Option<Cell>,
    direction: Direction,
    pending: Option<Direction>,
    alive: bool,
    rng: StdRng,
}

impl Simulation {
    /// Start a new game: snake in the top-left corner facing right,
    /// food in the center cell
    pub fn new(board: Board) -> Self {
        Self::with_rng(board, StdRng::from_entropy())
    }

    /// Start a new game with an injected random source (deterministic tests)
    pub fn with_rng(board: Board, rng: StdRng) -> Self {
        Self {
            board,
            snake: (0..INITIAL_SNAKE_LENGTH as Cell).collect(),
            food: Some(board.center()),
            direction: Direction::Right,
            pending: None,
            alive: true,
            rng,
        }
    }

    /// Body cells in tail-to-head order
    pub fn cells(&self) -> Vec<Cell> {
        self.snake.iter().copied().collect()
    }

    /// The head cell (most recently added segment)
    pub fn head(&self) -> Cell {
        *self.snake.back().expect("snake always has a head")
    }

    /// Current food cell, if any cell is still free
    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    /// False once the game has ended
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Cells eaten so far; the initial length never counts
    pub fn score(&self) -> u32 {
        self.snake.len().saturating_sub(INITIAL_SNAKE_LENGTH) as u32
    }

    /// Queue a direction change for the next tick.
    ///
    /// Overwrites any previously queued change; only the latest request
    /// before the next tick wins. Returns false when the request is a
    /// no-op: the game is over, or the direction is the exact reverse of
    /// the current one (the snake cannot move backwards).
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if !self.alive {
            return false;
        }
        if self.direction.is_opposite(direction) {
            return false;
        }
        self.pending = Some(direction);
        true
    }

    /// Advance the game by one move.
    ///
    /// Applies the pending direction (at most once per tick), steps the
    /// head, and checks the move in order: off the board, wrapped across a
    /// row boundary on a horizontal move, or onto the snake's own body. Any
    /// failure is terminal and leaves snake and food untouched.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.alive {
            return TickOutcome::Idle;
        }

        if let Some(direction) = self.pending.take() {
            self.direction = direction;
        }

        let head = self.head();
        let new_head = i32::from(head) + self.board.delta(self.direction);

        if new_head < 0 || new_head >= i32::from(self.board.cells()) {
            return self.die(Collision::Wall);
        }

        let new_head = new_head as Cell;

        // Flattening the grid makes a horizontal wrap look like a legal
        // move; the row must not change on a ±1 step.
        if self.direction.is_horizontal() && self.board.row(new_head) != self.board.row(head) {
            return self.die(Collision::Wall);
        }

        if self.snake.contains(&new_head) {
            return self.die(Collision::SelfBite);
        }

        self.snake.push_back(new_head);

        if Some(new_head) == self.food {
            // Grow: keep the tail, respawn food over the cells free after growth
            self.food = self.spawn_food();
            TickOutcome::Ate
        } else {
            self.snake.pop_front();
            TickOutcome::Moved
        }
    }

    fn die(&mut self, collision: Collision) -> TickOutcome {
        self.alive = false;
        TickOutcome::Died(collision)
    }

    /// Pick a food cell uniformly at random from all currently free cells,
    /// or `None` when the snake fills the board
    fn spawn_food(&mut self) -> Option<Cell> {
        let free: Vec<Cell> = (0..self.board.cells())
            .filter(|cell| !self.snake.contains(cell))
            .collect();

        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.gen_range(0..free.len())])
    }

    #[cfg(test)]
    pub(crate) fn place_food(&mut self, cell: Cell) {
        self.food = Some(cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(size: u16) -> Simulation {
        Simulation::with_rng(Board::new(size).unwrap(), StdRng::seed_from_u64(7))
    }

    fn assert_no_duplicates(sim: &Simulation) {
        let cells = sim.cells();
        let mut sorted = cells.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), cells.len(), "snake overlaps itself: {cells:?}");
    }

    #[test]
    fn test_initial_state() {
        let sim = sim(11);
        assert!(sim.is_alive());
        assert_eq!(sim.cells(), vec![0, 1, 2]);
        assert_eq!(sim.head(), 2);
        assert_eq!(sim.food(), Some(60));
        assert_eq!(sim.score(), 0);
    }

    #[test]
    fn test_plain_move_preserves_length() {
        let mut sim = sim(11);
        assert_eq!(sim.tick(), TickOutcome::Moved);
        assert_eq!(sim.cells(), vec![1, 2, 3]);
        assert_eq!(sim.score(), 0);
    }

    #[test]
    fn test_growth_on_food() {
        let mut sim = sim(11);
        sim.place_food(3);

        assert_eq!(sim.tick(), TickOutcome::Ate);
        assert_eq!(sim.cells(), vec![0, 1, 2, 3]);
        assert_eq!(sim.score(), 1);

        // New food comes from the 121 - 4 free cells
        let food = sim.food().expect("board is far from full");
        assert!(food < 121);
        assert!(!sim.cells().contains(&food));
    }

    #[test]
    fn test_reversal_is_rejected() {
        let mut sim = sim(11);
        assert!(!sim.request_direction(Direction::Left));

        // The rejected request must not affect the applied direction
        sim.tick();
        assert_eq!(sim.head(), 3);
    }

    #[test]
    fn test_latest_request_wins() {
        let mut sim = sim(11);
        assert!(sim.request_direction(Direction::Up));
        assert!(sim.request_direction(Direction::Down));

        sim.tick();
        assert_eq!(sim.head(), 2 + 11);
    }

    #[test]
    fn test_pending_applied_once() {
        let mut sim = sim(11);
        sim.request_direction(Direction::Down);

        sim.tick();
        assert_eq!(sim.head(), 13);

        // No new request: the snake keeps going down, not back to Right
        sim.tick();
        assert_eq!(sim.head(), 24);
    }

    #[test]
    fn test_reversal_checked_against_current_not_pending() {
        let mut sim = sim(11);
        sim.request_direction(Direction::Down);

        // Current direction is still Right until the next tick, so Left is
        // a reversal even though Down is queued
        assert!(!sim.request_direction(Direction::Left));

        sim.tick();
        assert_eq!(sim.head(), 13);
    }

    #[test]
    fn test_wall_collision_top() {
        let mut sim = sim(5);
        sim.request_direction(Direction::Up);

        assert_eq!(sim.tick(), TickOutcome::Died(Collision::Wall));
        assert!(!sim.is_alive());
        assert_eq!(sim.cells(), vec![0, 1, 2]);
    }

    #[test]
    fn test_row_wrap_is_fatal() {
        // Head reaches index 4 (row 0, last column); one more step right
        // lands on 5, which is in range but in row 1
        let mut sim = sim(5);
        sim.place_food(24);
        assert_eq!(sim.tick(), TickOutcome::Moved);
        assert_eq!(sim.tick(), TickOutcome::Moved);
        assert_eq!(sim.head(), 4);

        assert_eq!(sim.tick(), TickOutcome::Died(Collision::Wall));
        assert!(!sim.is_alive());
    }

    #[test]
    fn test_self_collision() {
        let mut sim = sim(11);

        // Grow to length 5, steering food away from the turning circle
        sim.place_food(3);
        assert_eq!(sim.tick(), TickOutcome::Ate);
        sim.place_food(4);
        assert_eq!(sim.tick(), TickOutcome::Ate);
        sim.place_food(120);
        assert_eq!(sim.cells(), vec![0, 1, 2, 3, 4]);

        // Tight clockwise turn: right, down, left, then up into the body
        sim.request_direction(Direction::Down);
        assert_eq!(sim.tick(), TickOutcome::Moved);
        sim.request_direction(Direction::Left);
        assert_eq!(sim.tick(), TickOutcome::Moved);
        sim.request_direction(Direction::Up);

        let before = sim.cells();
        assert_eq!(sim.tick(), TickOutcome::Died(Collision::SelfBite));
        assert!(!sim.is_alive());
        assert_eq!(sim.cells(), before);
        assert_eq!(sim.food(), Some(120));
    }

    #[test]
    fn test_terminal_tick_is_noop() {
        let mut sim = sim(5);
        sim.request_direction(Direction::Up);
        sim.tick();
        assert!(!sim.is_alive());

        let snake = sim.cells();
        let food = sim.food();
        assert_eq!(sim.tick(), TickOutcome::Idle);
        assert_eq!(sim.cells(), snake);
        assert_eq!(sim.food(), food);
        assert!(!sim.request_direction(Direction::Down));
    }

    #[test]
    fn test_score_tracks_growth() {
        let mut sim = sim(11);

        // Eat along the top row: head goes 3, 4, ..., 9
        for (eaten, cell) in (3..10).enumerate() {
            sim.place_food(cell);
            assert_eq!(sim.tick(), TickOutcome::Ate);
            assert_eq!(sim.score(), eaten as u32 + 1);
            assert_eq!(sim.cells().len(), INITIAL_SNAKE_LENGTH + eaten + 1);
        }
    }

    #[test]
    fn test_invariants_hold_across_growth() {
        let mut sim = sim(11);

        for cell in 3..10 {
            sim.place_food(cell);
            sim.tick();
            assert_no_duplicates(&sim);
            if let Some(food) = sim.food() {
                assert!(!sim.cells().contains(&food), "food spawned on the snake");
            }
        }
    }

    #[test]
    fn test_full_board_leaves_no_food() {
        // Boustrophedon body covering every cell of a 5x5 board except 24,
        // with the food there and the head one step away
        let body: Vec<Cell> = vec![
            0, 1, 2, 3, 4, 9, 8, 7, 6, 5, 10, 11, 12, 13, 14, 19, 18, 17, 16, 15, 20, 21, 22, 23,
        ];
        let mut sim = Simulation {
            board: Board::new(5).unwrap(),
            snake: VecDeque::from(body),
            food: Some(24),
            direction: Direction::Right,
            pending: None,
            alive: true,
            rng: StdRng::seed_from_u64(7),
        };

        assert_eq!(sim.tick(), TickOutcome::Ate);
        assert!(sim.is_alive());
        assert_eq!(sim.food(), None);
        assert_eq!(sim.score(), 25 - INITIAL_SNAKE_LENGTH as u32);
    }
}
