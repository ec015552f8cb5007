//! Q-value network for the DQN agent
//!
//! A small multilayer perceptron mapping the 28-value observation to
//! one score per relative action:
//!
//! ```text
//! Input: [batch, 28]
//!   | Linear(28 -> hidden) + ReLU
//!   | Linear(hidden -> hidden) + ReLU
//!   | Linear(hidden -> 3)
//! Output: [batch, 3] action values (straight, right turn, left turn)
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{activation::relu, backend::Backend, Tensor},
};
use serde::{Deserialize, Serialize};

use super::observation::STATE_SIZE;
use crate::game::TurnAction;

/// Configuration for the Q-network.
///
/// Also serves as the shape descriptor persisted alongside saved
/// weights, so a loader can reject weights trained for a different
/// feature vector (e.g. an older 11-feature model) instead of crashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QNetworkConfig {
    /// Size of the observation vector
    pub state_size: usize,
    /// Width of the two hidden layers
    pub hidden_size: usize,
    /// Number of actions scored by the output layer
    pub num_actions: usize,
}

impl QNetworkConfig {
    pub fn new(hidden_size: usize) -> Self {
        Self {
            state_size: STATE_SIZE,
            hidden_size,
            num_actions: TurnAction::ALL.len(),
        }
    }

    /// Pure compatibility check between this shape and a persisted one
    pub fn is_compatible(&self, other: &QNetworkConfig) -> bool {
        self == other
    }

    /// Initialize a Q-network from this configuration
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            fc1: LinearConfig::new(self.state_size, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
            out: LinearConfig::new(self.hidden_size, self.num_actions).init(device),
        }
    }
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self::new(512)
    }
}

/// Fully connected Q-network
///
/// Generic over the Burn backend so the same definition serves plain
/// inference (`NdArray`) and training (`Autodiff<NdArray>`).
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    out: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass: `[batch, state_size]` -> `[batch, num_actions]`
    pub fn forward(&self, observation: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(observation));
        let x = relu(self.fc2.forward(x));
        self.out.forward(x)
    }
}
