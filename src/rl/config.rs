//! DQN hyperparameter and reward-shaping configuration

use serde::{Deserialize, Serialize};

/// Configuration for the DQN agent and the trainer's reward shaping
///
/// The shaping thresholds are empirical tuning constants, not derived
/// quantities, so they are kept configurable rather than hard-coded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqnConfig {
    /// Learning rate for the Adam optimizer
    pub learning_rate: f64,

    /// Discount factor for future rewards (gamma)
    pub gamma: f32,

    /// Exploration rate at the start of training
    pub epsilon_start: f32,

    /// Exploration floor the decay approaches but never reaches
    pub epsilon_end: f32,

    /// Time constant (in games) of the exponential epsilon decay
    pub epsilon_decay_games: f32,

    /// Replay buffer capacity
    pub memory_size: usize,

    /// Minibatch size for the long-memory update
    pub batch_size: usize,

    /// Width of the Q-network's hidden layers
    pub hidden_size: usize,

    // Reward shaping, applied by the trainer on non-terminal steps
    /// Bonus when the head moved closer to the food
    pub closer_bonus: f32,
    /// Penalty when the head moved away from the food
    pub farther_penalty: f32,
    /// Penalty when mean body density exceeds `density_threshold`
    pub high_density_penalty: f32,
    pub density_threshold: f32,
    /// Bonus when mean free-space ratio exceeds `free_space_threshold`
    pub efficient_space_bonus: f32,
    pub free_space_threshold: f32,
    /// Penalty when the potential-trap flag is set
    pub trap_penalty: f32,
    /// Penalty when the tail-blocking flag is set
    pub tail_block_penalty: f32,
    /// Per-segment bonus added on every non-terminal step
    pub size_bonus: f32,
}

impl DqnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.epsilon_start)
            || !(0.0..=1.0).contains(&self.epsilon_end)
        {
            return Err(format!(
                "epsilon bounds must be in [0, 1], got start {} end {}",
                self.epsilon_start, self.epsilon_end
            ));
        }

        if self.epsilon_end > self.epsilon_start {
            return Err(format!(
                "epsilon_end ({}) cannot exceed epsilon_start ({})",
                self.epsilon_end, self.epsilon_start
            ));
        }

        if self.epsilon_decay_games <= 0.0 {
            return Err(format!(
                "epsilon_decay_games must be positive, got {}",
                self.epsilon_decay_games
            ));
        }

        if self.memory_size == 0 {
            return Err("memory_size must be at least 1".to_string());
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.batch_size > self.memory_size {
            return Err(format!(
                "batch_size ({}) cannot exceed memory_size ({})",
                self.batch_size, self.memory_size
            ));
        }

        if self.hidden_size == 0 {
            return Err("hidden_size must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            gamma: 0.9,
            epsilon_start: 1.0,
            epsilon_end: 0.01,
            epsilon_decay_games: 1000.0,
            memory_size: 10_000,
            batch_size: 32,
            hidden_size: 512,
            closer_bonus: 2.0,
            farther_penalty: -1.0,
            high_density_penalty: -3.0,
            density_threshold: 0.7,
            efficient_space_bonus: 3.0,
            free_space_threshold: 0.5,
            trap_penalty: -8.0,
            tail_block_penalty: -4.0,
            size_bonus: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DqnConfig::default();
        assert_eq!(config.learning_rate, 1e-3);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.epsilon_start, 1.0);
        assert_eq!(config.epsilon_end, 0.01);
        assert_eq!(config.memory_size, 10_000);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.hidden_size, 512);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(DqnConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_negative_learning_rate() {
        let config = DqnConfig {
            learning_rate: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_gamma_out_of_range() {
        let config = DqnConfig {
            gamma: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_epsilon_ordering() {
        let config = DqnConfig {
            epsilon_start: 0.1,
            epsilon_end: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_batch_size_exceeds_memory() {
        let config = DqnConfig {
            batch_size: 20_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_sizes() {
        for field in 0..3 {
            let mut config = DqnConfig::default();
            match field {
                0 => config.memory_size = 0,
                1 => config.batch_size = 0,
                _ => config.hidden_size = 0,
            }
            assert!(config.validate().is_err());
        }
    }
}
