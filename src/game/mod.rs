//! Core game logic for the snake environment
//!
//! Contains the grid/state types, the relative action model, and the
//! engine that advances the game one tick at a time.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

pub use action::{Direction, TurnAction};
pub use config::GameConfig;
pub use engine::{GameEngine, StepResult};
pub use state::{GameState, Position, Snake};
