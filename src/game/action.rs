use serde::{Deserialize, Serialize};

/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }

    /// Returns true for motion along the x axis
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Returns true if `other` moves along the other axis
    pub fn is_orthogonal(&self, other: Direction) -> bool {
        self.is_horizontal() != other.is_horizontal()
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Input alphabet of the engine's reducer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Advance the simulation by one cell
    Tick,
    /// Request a turn; also starts a game that has not started yet
    SetDirection(Direction),
    /// Flip between running and paused
    TogglePause,
    /// Start over from the initial layout
    Reset,
}

impl From<Direction> for GameEvent {
    fn from(direction: Direction) -> Self {
        GameEvent::SetDirection(direction)
    }
}
