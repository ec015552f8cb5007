//! DQN Snake - a Snake game trained with deep Q-learning
//!
//! This library provides:
//! - Core game logic (game module)
//! - Feature extraction, Q-network, replay and the agent (rl module)
//! - Training statistics (metrics module)
//! - Execution modes (modes module)

pub mod game;
pub mod metrics;
pub mod modes;
pub mod rl;
