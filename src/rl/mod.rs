//! Reinforcement learning for the snake game
//!
//! Provides:
//! - 28-value feature extraction from game state
//! - Q-network (28 -> hidden -> hidden -> 3) on Burn
//! - Ring-buffer experience replay
//! - DQN agent with epsilon-greedy selection and TD updates
//! - Weight persistence with a shape-checked fallback

pub mod backend;
pub mod buffer;
pub mod config;
pub mod dqn;
pub mod network;
pub mod observation;
pub mod persistence;

pub use backend::{default_device, InferenceBackend, TrainingBackend};
pub use buffer::{ReplayBuffer, Transition};
pub use config::DqnConfig;
pub use dqn::{AgentStats, DqnAgent};
pub use network::{QNetwork, QNetworkConfig};
pub use observation::{extract, summary, Observation, StateSummary, STATE_SIZE};
pub use persistence::{load_network, save_agent, LoadOutcome, ModelMetadata};
