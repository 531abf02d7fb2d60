use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Direction the next tick moves in
    pub direction: Direction,
}

impl Snake {
    /// Single-segment snake, the shape every game starts with
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: vec![head],
            direction,
        }
    }

    /// Build a snake from explicit segments, head first
    ///
    /// Panics on an empty body; a snake always has a head.
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Self {
        assert!(!body.is_empty(), "snake needs at least one segment");
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Check if position is on any segment, head and tail included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Put a new head in front; drop the tail unless growing
    pub fn advance_to(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Coarse state of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the first directional input
    #[default]
    NotStarted,
    Running,
    Paused,
    /// Terminal until the next reset
    GameOver,
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake covers every cell; nowhere left to put food
    BoardFull,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub grid_width: usize,
    pub grid_height: usize,
    pub score: u32,
    /// Successful ticks since the last reset
    pub steps: u32,
    pub phase: Phase,
    /// Set when the phase flips to `GameOver`
    pub collision: Option<CollisionType>,
}

impl GameState {
    /// Create a new game state in the `NotStarted` phase
    pub fn new(snake: Snake, food: Position, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snake,
            food,
            grid_width,
            grid_height,
            score: 0,
            steps: 0,
            phase: Phase::NotStarted,
            collision: None,
        }
    }

    /// Builder-style phase override, handy for setting up a game mid-flight
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.occupies(pos)
    }

    pub fn direction(&self) -> Direction {
        self.snake.direction
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}
