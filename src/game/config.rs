use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::action::Direction;
use super::state::Position;

/// Side length of the default square grid
pub const GRID_SIZE: usize = 20;

/// Largest accepted grid side; the renderer draws every cell each frame
pub const MAX_GRID_SIDE: usize = 256;

/// Points awarded for each piece of food
pub const FOOD_REWARD: u32 = 10;

/// Default simulation period
pub const TICK_INTERVAL_MS: u64 = 150;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Cell the single-segment snake starts on
    pub initial_head: Position,
    /// Direction of motion after a reset
    pub initial_direction: Direction,
    /// Fixed cell the first piece of food is placed on
    pub initial_food: Position,
    /// Score added per piece of food
    pub food_reward: u32,
    /// Milliseconds between ticks
    pub tick_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(GRID_SIZE, GRID_SIZE)
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    ///
    /// The snake starts in the center and the first food sits three quarters
    /// of the way across on both axes, which on the default 20x20 grid gives
    /// `(10, 10)` and `(15, 15)`.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            initial_head: Position::new((width / 2) as i32, (height / 2) as i32),
            initial_direction: Direction::Right,
            initial_food: Position::new((width * 3 / 4) as i32, (height * 3 / 4) as i32),
            food_reward: FOOD_REWARD,
            tick_interval_ms: TICK_INTERVAL_MS,
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn contains(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Reject layouts the engine cannot start from
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width > 0 && self.grid_height > 0,
            "grid must be at least 1x1, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.grid_width <= MAX_GRID_SIDE && self.grid_height <= MAX_GRID_SIDE,
            "grid sides are limited to {}, got {}x{}",
            MAX_GRID_SIDE,
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.contains(self.initial_head),
            "initial head {:?} is outside the {}x{} grid",
            self.initial_head,
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.contains(self.initial_food),
            "initial food {:?} is outside the {}x{} grid",
            self.initial_food,
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.initial_food != self.initial_head,
            "initial food and initial head share cell {:?}",
            self.initial_head
        );
        ensure!(self.tick_interval_ms > 0, "tick interval must be positive");
        Ok(())
    }

    /// Parse a YAML document holding any subset of the fields
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_yaml_ng::from_str(content).context("Failed to parse config")?;
        let config = file.into_config();
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).context("Failed to serialize config")
    }
}

/// On-disk form: every field optional, positions derived from the grid size
/// unless given explicitly.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    grid_width: Option<usize>,
    grid_height: Option<usize>,
    initial_head: Option<Position>,
    initial_direction: Option<Direction>,
    initial_food: Option<Position>,
    food_reward: Option<u32>,
    tick_interval_ms: Option<u64>,
}

impl ConfigFile {
    fn into_config(self) -> GameConfig {
        let base = GameConfig::new(
            self.grid_width.unwrap_or(GRID_SIZE),
            self.grid_height.unwrap_or(GRID_SIZE),
        );
        GameConfig {
            initial_head: self.initial_head.unwrap_or(base.initial_head),
            initial_direction: self.initial_direction.unwrap_or(base.initial_direction),
            initial_food: self.initial_food.unwrap_or(base.initial_food),
            food_reward: self.food_reward.unwrap_or(base.food_reward),
            tick_interval_ms: self.tick_interval_ms.unwrap_or(base.tick_interval_ms),
            ..base
        }
    }
}
