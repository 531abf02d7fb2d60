//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The engine is a reducer: feed it the current [`GameState`] and a [`GameEvent`],
//! get the next state back.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Direction, GameEvent};
pub use config::{FOOD_REWARD, GRID_SIZE, GameConfig, MAX_GRID_SIDE, TICK_INTERVAL_MS};
pub use engine::GameEngine;
pub use state::{CollisionType, GameState, Phase, Position, Snake};
