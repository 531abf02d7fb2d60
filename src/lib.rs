//! Apple Eater - a Snake game for the terminal
//!
//! This library provides:
//! - Core game logic as a reducer over an explicit state (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - Per-session play statistics (metrics module)
//! - The interactive play loop (modes module)

pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
