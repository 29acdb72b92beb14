//! Direction enum for snake movement

/// Direction of movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Moving up one row
    Up,
    /// Moving down one row
    Down,
    /// Moving left one column
    Left,
    /// Moving right one column
    Right,
}

impl Direction {
    /// Parse a browser key name ("ArrowUp") or short alias ("up")
    pub fn from_key(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "arrowup" | "up" => Some(Direction::Up),
            "arrowdown" | "down" => Some(Direction::Down),
            "arrowleft" | "left" => Some(Direction::Left),
            "arrowright" | "right" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Check if this direction is the exact reverse of another
    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }

    /// Check if the movement is along a row
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}
