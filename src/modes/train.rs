//! Training mode for the DQN agent
//!
//! Runs the episode loop: extract the observation, pick an action,
//! step the game, shape the reward, feed the transition to the agent.
//! The agent trains on every transition (short memory) and once per
//! episode on a replay minibatch (long memory). Progress is logged and
//! checkpoints are written periodically.
//!
//! # Example
//!
//! ```rust,ignore
//! use dqn_snake::modes::{TrainMode, TrainConfig};
//! use dqn_snake::rl::{default_device, TrainingBackend};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(10000, PathBuf::from("models/snake.mpk"));
//! let device = default_device();
//! let mut train_mode = TrainMode::<TrainingBackend>::new(config, device)?;
//! train_mode.run()?;
//! ```

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use std::path::{Path, PathBuf};

use crate::game::{GameConfig, GameEngine};
use crate::metrics::TrainingStats;
use crate::rl::{extract, summary, DqnAgent, DqnConfig, StateSummary, Transition};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Path to save the final trained model
    pub save_path: PathBuf,

    /// Save a checkpoint every N episodes
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Resume from weights at `save_path` if present
    pub resume: bool,

    /// Game configuration (grid size, base rewards)
    pub game_config: GameConfig,

    /// Agent hyperparameters and shaping constants
    pub dqn_config: DqnConfig,
}

impl TrainConfig {
    /// Create a training configuration with defaults
    pub fn new(num_episodes: usize, save_path: PathBuf) -> Self {
        Self {
            num_episodes,
            save_path,
            checkpoint_frequency: 1000,
            log_frequency: 100,
            resume: false,
            game_config: GameConfig::default(),
            dqn_config: DqnConfig::default(),
        }
    }
}

/// Training mode for the DQN agent
pub struct TrainMode<B: AutodiffBackend> {
    /// Agent being trained
    agent: DqnAgent<B>,

    /// Game engine driving the episodes
    engine: GameEngine,

    /// Training statistics tracker
    stats: TrainingStats,

    /// Training configuration
    config: TrainConfig,

    /// Current episode number
    current_episode: usize,
}

impl<B: AutodiffBackend> TrainMode<B> {
    /// Create a new training mode.
    ///
    /// With `resume` set and a model file at `save_path`, previously
    /// saved weights and statistics are restored; weights with an
    /// incompatible shape leave the fresh network in place and only
    /// restore the statistics.
    pub fn new(config: TrainConfig, device: B::Device) -> Result<Self> {
        let mut agent = DqnAgent::new(config.dqn_config.clone(), device)?;

        if config.resume && config.save_path.exists() {
            let weights_loaded = agent
                .load(&config.save_path)
                .with_context(|| format!("Failed to resume from {:?}", config.save_path))?;
            if weights_loaded {
                println!(
                    "Resumed from {:?} ({} games played)",
                    config.save_path,
                    agent.games_played()
                );
            }
        }

        let engine = GameEngine::new(config.game_config.clone());
        let stats = TrainingStats::new(100);

        Ok(Self {
            agent,
            engine,
            stats,
            config,
            current_episode: 0,
        })
    }

    /// Run the training loop.
    ///
    /// Trains the agent for the configured number of episodes, logging
    /// progress and saving checkpoints periodically, then writes the
    /// final model.
    pub fn run(&mut self) -> Result<()> {
        self.print_header();

        for episode in 0..self.config.num_episodes {
            self.current_episode = episode;

            let (episode_reward, episode_steps, episode_score) = self.run_episode();

            self.stats
                .record_episode(episode_reward, episode_steps, episode_score);

            if (episode + 1) % self.config.log_frequency == 0 {
                self.print_progress(episode + 1);
            }

            if (episode + 1) % self.config.checkpoint_frequency == 0 {
                self.save_checkpoint()?;
            }
        }

        self.save_model()?;

        println!("\nTraining complete!");
        println!("Final model saved to: {:?}", self.config.save_path);
        println!("Best score: {}", self.agent.record());
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());

        Ok(())
    }

    /// Run a single training episode.
    ///
    /// Returns the total shaped reward, the number of ticks and the
    /// final score.
    fn run_episode(&mut self) -> (f32, usize, u32) {
        let mut state = self.engine.reset();
        let mut episode_reward = 0.0;
        let mut episode_steps = 0;

        loop {
            let observation = extract(&state);
            let pre = summary(&state);

            let action = self.agent.choose_action(&observation);
            let result = self.engine.step(&mut state, Some(action));

            let post = summary(&state);
            let reward = shape_reward(
                result.reward,
                result.terminated,
                &pre,
                &post,
                &self.config.dqn_config,
            );

            let next_observation = extract(&state);
            self.agent.observe(Transition {
                state: observation,
                action,
                reward,
                next_state: next_observation,
                terminal: result.terminated,
            });

            episode_reward += reward;
            episode_steps += 1;

            if result.terminated {
                let loss = self.agent.finish_episode(result.score);
                self.stats.record_loss(loss);
                return (episode_reward, episode_steps, result.score);
            }
        }
    }

    /// Save a checkpoint of the current model
    fn save_checkpoint(&self) -> Result<()> {
        let checkpoint_path = self
            .config
            .save_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_ep{}.mpk", self.current_episode + 1));

        self.agent
            .save(&checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        println!("  Checkpoint saved: {:?}", checkpoint_path);

        Ok(())
    }

    /// Save the final trained model
    fn save_model(&self) -> Result<()> {
        self.agent.save(&self.config.save_path).with_context(|| {
            format!("Failed to save final model to {:?}", self.config.save_path)
        })
    }

    pub fn agent(&self) -> &DqnAgent<B> {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Print training header information
    fn print_header(&self) {
        println!("{}", "=".repeat(70));
        println!("DQN Training - Snake");
        println!("{}", "=".repeat(70));
        println!("Episodes: {}", self.config.num_episodes);
        println!(
            "Game Config: {}x{} grid",
            self.config.game_config.grid_width, self.config.game_config.grid_height
        );
        println!("DQN Config:");
        println!("  Learning rate: {}", self.config.dqn_config.learning_rate);
        println!("  Gamma: {}", self.config.dqn_config.gamma);
        println!(
            "  Epsilon: {} -> {} over ~{} games",
            self.config.dqn_config.epsilon_start,
            self.config.dqn_config.epsilon_end,
            self.config.dqn_config.epsilon_decay_games
        );
        println!("  Replay capacity: {}", self.config.dqn_config.memory_size);
        println!("  Batch size: {}", self.config.dqn_config.batch_size);
        println!("  Hidden size: {}", self.config.dqn_config.hidden_size);
        println!(
            "Checkpoints: Every {} episodes",
            self.config.checkpoint_frequency
        );
        println!("Logging: Every {} episodes", self.config.log_frequency);
        println!("Save path: {:?}", self.config.save_path);
        println!("{}", "=".repeat(70));
        println!();
    }

    /// Print training progress
    fn print_progress(&self, episode: usize) {
        println!(
            "[Episode {}/{}] {} | eps {:.3} | record {}",
            episode,
            self.config.num_episodes,
            self.stats.format_summary(),
            self.agent.epsilon(),
            self.agent.record()
        );
    }
}

/// Shape the base reward with positional heuristics.
///
/// Terminal steps pass the base reward (the death penalty) through
/// unchanged. On non-terminal steps the adjustments stack:
/// - moved closer to / farther from the food (pre vs post distance)
/// - mean body density above the threshold
/// - mean free-space ratio above the threshold
/// - potential-trap and tail-blocking flags
/// - a per-segment size bonus
pub fn shape_reward(
    base: f32,
    terminated: bool,
    pre: &StateSummary,
    post: &StateSummary,
    config: &DqnConfig,
) -> f32 {
    if terminated {
        return base;
    }

    let mut reward = base;

    if post.distance_to_food < pre.distance_to_food {
        reward += config.closer_bonus;
    } else if post.distance_to_food > pre.distance_to_food {
        reward += config.farther_penalty;
    }

    if post.body_density > config.density_threshold {
        reward += config.high_density_penalty;
    }

    if post.free_space_ratio > config.free_space_threshold {
        reward += config.efficient_space_bonus;
    }

    if post.trap_risk {
        reward += config.trap_penalty;
    }

    if post.tail_blocking {
        reward += config.tail_block_penalty;
    }

    reward += config.size_bonus * post.snake_length as f32;

    reward
}
