//! DQN agent: action selection, experience storage, and the
//! temporal-difference update
//!
//! The agent owns the Q-network, the Adam optimizer and the replay
//! buffer. Every transition triggers an immediate single-sample update
//! ("short memory"); once per completed episode a minibatch sampled
//! from replay is trained on ("long memory").

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, backend::Backend, ElementConversion, Int, Tensor, TensorData},
};
use rand::{rngs::ThreadRng, Rng};
use std::path::Path;

use super::buffer::{ReplayBuffer, Transition};
use super::config::DqnConfig;
use super::network::{QNetwork, QNetworkConfig};
use super::observation::{Observation, STATE_SIZE};
use super::persistence::{self, LoadOutcome, ModelMetadata};
use crate::game::TurnAction;

/// Scalar statistics exported for reporting and persistence
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStats {
    pub games_played: usize,
    pub epsilon: f32,
    pub record: u32,
    pub mean_score: f32,
    pub recent_scores: Vec<u32>,
    pub total_score: u32,
}

/// Value-based agent trained with temporal-difference updates
pub struct DqnAgent<B: AutodiffBackend> {
    /// Q-network scoring the three relative actions
    network: QNetwork<B>,

    /// Adam optimizer for network parameters
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,

    /// Hyperparameters
    config: DqnConfig,

    /// Bounded replay store, owned exclusively by the agent
    buffer: ReplayBuffer,

    /// Completed games, drives the epsilon decay
    n_games: usize,

    /// Current exploration rate, recomputed on every action request
    epsilon: f32,

    /// Best score seen so far
    record: u32,

    /// Per-game scores in completion order
    scores: Vec<u32>,

    /// Running mean score after each game
    mean_scores: Vec<f32>,

    /// Sum of all scores
    total_score: u32,

    device: B::Device,
    rng: ThreadRng,
}

impl<B: AutodiffBackend> DqnAgent<B> {
    /// Create a new agent with a freshly initialized network
    pub fn new(config: DqnConfig, device: B::Device) -> Result<Self> {
        config.validate().map_err(anyhow::Error::msg)?;

        let network = QNetworkConfig::new(config.hidden_size).init::<B>(&device);
        let optim = AdamConfig::new().init();
        let buffer = ReplayBuffer::new(config.memory_size);
        let epsilon = config.epsilon_start;

        Ok(Self {
            network,
            optim,
            config,
            buffer,
            n_games: 0,
            epsilon,
            record: 0,
            scores: Vec::new(),
            mean_scores: Vec::new(),
            total_score: 0,
            device,
            rng: rand::thread_rng(),
        })
    }

    /// Select an action for an observation.
    ///
    /// Recomputes the exploration rate from the games-played counter
    /// (continuous exponential decay toward `epsilon_end`) as a side
    /// effect of every call. With probability epsilon a uniformly
    /// random action is taken; otherwise the Q-network's argmax, with
    /// ties broken by first index.
    pub fn choose_action(&mut self, observation: &Observation) -> TurnAction {
        self.epsilon = self.config.epsilon_end
            + (self.config.epsilon_start - self.config.epsilon_end)
                * (-(self.n_games as f32) / self.config.epsilon_decay_games).exp();

        if self.rng.gen::<f32>() < self.epsilon {
            let idx = self.rng.gen_range(0..TurnAction::ALL.len());
            return TurnAction::from_index(idx);
        }

        let scores = self.predict(observation);
        let mut best = 0;
        for i in 1..scores.len() {
            if scores[i] > scores[best] {
                best = i;
            }
        }
        TurnAction::from_index(best)
    }

    /// Q-values for a single observation, without gradient tracking
    pub fn predict(&self, observation: &Observation) -> [f32; 3] {
        let input: Tensor<B::InnerBackend, 2> = Tensor::from_data(
            TensorData::new(observation.to_vec(), [1, STATE_SIZE]),
            &self.device,
        );
        let output = self.network.valid().forward(input);
        let values: Vec<f32> = output
            .into_data()
            .to_vec()
            .expect("Failed to convert Q-values to vec");
        [values[0], values[1], values[2]]
    }

    /// Store a transition and run the immediate single-sample update
    /// ("short memory"). Returns the TD loss of the update.
    pub fn observe(&mut self, transition: Transition) -> f32 {
        let loss = self.train_step(std::slice::from_ref(&transition));
        self.buffer.push(transition);
        loss
    }

    /// Run a batched update from replay ("long memory"): a minibatch
    /// sampled without replacement, or the whole store when it holds
    /// fewer than `batch_size` transitions. Returns the TD loss.
    pub fn consolidate(&mut self) -> f32 {
        let batch = self.buffer.sample(self.config.batch_size, &mut self.rng);
        self.train_step(&batch)
    }

    /// Close out a finished episode: bump the games counter, run the
    /// long-memory update and fold the score into the statistics.
    pub fn finish_episode(&mut self, score: u32) -> f32 {
        self.n_games += 1;
        let loss = self.consolidate();

        if score > self.record {
            self.record = score;
        }
        self.scores.push(score);
        self.total_score += score;
        self.mean_scores
            .push(self.total_score as f32 / self.n_games as f32);

        loss
    }

    /// One gradient step of TD learning over a batch of transitions.
    ///
    /// target = r                          if terminal
    ///          r + gamma * max_a' Q(s',a') otherwise
    ///
    /// The next-state pass runs without gradient tracking; the loss is
    /// the MSE between the taken action's Q-value and the target.
    /// Works identically for batch size 1 and batch size N.
    fn train_step(&mut self, batch: &[Transition]) -> f32 {
        if batch.is_empty() {
            return 0.0;
        }
        let n = batch.len();

        let next_states = batch_states::<B::InnerBackend>(
            batch.iter().map(|t| &t.next_state),
            n,
            &self.device,
        );
        let next_q = self.network.valid().forward(next_states);
        let next_max: Vec<f32> = next_q
            .max_dim(1)
            .into_data()
            .to_vec()
            .expect("Failed to convert Q-values to vec");

        let targets: Vec<f32> = batch
            .iter()
            .zip(next_max.iter())
            .map(|(t, &max_next)| {
                if t.terminal {
                    t.reward
                } else {
                    t.reward + self.config.gamma * max_next
                }
            })
            .collect();

        let states = batch_states::<B>(batch.iter().map(|t| &t.state), n, &self.device);
        let q_values = self.network.forward(states);

        let action_indices: Vec<i32> = batch.iter().map(|t| t.action.index() as i32).collect();
        let actions: Tensor<B, 1, Int> =
            Tensor::from_data(TensorData::new(action_indices, [n]), &self.device);
        let taken: Tensor<B, 1> = q_values.gather(1, actions.unsqueeze_dim(1)).squeeze(1);

        let target_tensor: Tensor<B, 1> =
            Tensor::from_data(TensorData::new(targets, [n]), &self.device);

        let diff = taken - target_tensor;
        let loss = (diff.clone() * diff).mean();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optim
            .step(self.config.learning_rate, self.network.clone(), grads);

        loss.into_scalar().elem::<f32>()
    }

    /// Exported scalar statistics for reporting collaborators
    pub fn stats(&self) -> AgentStats {
        let recent_scores: Vec<u32> = self
            .scores
            .iter()
            .rev()
            .take(10)
            .rev()
            .copied()
            .collect();

        AgentStats {
            games_played: self.n_games,
            epsilon: self.epsilon,
            record: self.record,
            mean_score: self.mean_scores.last().copied().unwrap_or(0.0),
            recent_scores,
            total_score: self.total_score,
        }
    }

    pub fn games_played(&self) -> usize {
        self.n_games
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn record(&self) -> u32 {
        self.record
    }

    pub fn replay_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn network(&self) -> &QNetwork<B> {
        &self.network
    }

    /// Shape descriptor of the current network
    pub fn network_config(&self) -> QNetworkConfig {
        QNetworkConfig::new(self.config.hidden_size)
    }

    /// Save network weights and training metadata
    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save_agent(self, path)
    }

    /// Load previously saved weights and statistics.
    ///
    /// Returns `Ok(true)` when the weights were loaded. A shape
    /// mismatch (weights trained for a different feature vector or
    /// hidden size) is not fatal: the current network is kept, the
    /// non-network statistics are still restored from the metadata,
    /// and `Ok(false)` is returned.
    pub fn load(&mut self, path: &Path) -> Result<bool> {
        match persistence::load_network::<B>(path, &self.network_config(), &self.device)? {
            LoadOutcome::Loaded { network, metadata } => {
                self.network = network;
                self.restore_stats(&metadata);
                Ok(true)
            }
            LoadOutcome::ShapeMismatch { metadata } => {
                println!(
                    "Saved weights have incompatible shape {:?}; keeping a fresh network",
                    metadata.shape
                );
                self.restore_stats(&metadata);
                Ok(false)
            }
        }
    }

    fn restore_stats(&mut self, metadata: &ModelMetadata) {
        self.n_games = metadata.n_games;
        self.epsilon = metadata.epsilon;
        self.record = metadata.record;
        self.total_score = metadata.total_score;
    }
}

/// Pack observations into a `[n, STATE_SIZE]` tensor
fn batch_states<'a, B: Backend>(
    observations: impl Iterator<Item = &'a Observation>,
    n: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    let mut flat = Vec::with_capacity(n * STATE_SIZE);
    for obs in observations {
        flat.extend_from_slice(obs);
    }
    Tensor::from_data(TensorData::new(flat, [n, STATE_SIZE]), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::backend::{default_device, TrainingBackend};

    fn test_config() -> DqnConfig {
        DqnConfig {
            hidden_size: 32,
            memory_size: 100,
            batch_size: 8,
            ..Default::default()
        }
    }

    fn test_agent() -> DqnAgent<TrainingBackend> {
        DqnAgent::new(test_config(), default_device()).unwrap()
    }

    fn transition(reward: f32, terminal: bool) -> Transition {
        Transition {
            state: [0.1; 28],
            action: TurnAction::Straight,
            reward,
            next_state: [0.2; 28],
            terminal,
        }
    }

    #[test]
    fn test_agent_creation() {
        let agent = test_agent();
        assert_eq!(agent.games_played(), 0);
        assert_eq!(agent.record(), 0);
        assert_eq!(agent.replay_len(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DqnConfig {
            gamma: 2.0,
            ..test_config()
        };
        assert!(DqnAgent::<TrainingBackend>::new(config, default_device()).is_err());
    }

    #[test]
    fn test_choose_action_recomputes_epsilon() {
        let mut agent = test_agent();
        agent.choose_action(&[0.0; 28]);

        // With zero games played the rate sits at epsilon_start
        assert!((agent.epsilon() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_epsilon_decays_with_games() {
        let mut agent = test_agent();
        for _ in 0..1000 {
            agent.finish_episode(0);
        }
        agent.choose_action(&[0.0; 28]);

        let expected = 0.01 + (1.0 - 0.01) * (-1.0f32).exp();
        assert!((agent.epsilon() - expected).abs() < 1e-4);
        assert!(agent.epsilon() > agent.config().epsilon_end);
    }

    #[test]
    fn test_greedy_action_matches_prediction() {
        let config = DqnConfig {
            epsilon_start: 0.0,
            epsilon_end: 0.0,
            ..test_config()
        };
        let mut agent = DqnAgent::<TrainingBackend>::new(config, default_device()).unwrap();

        let obs = [0.3; 28];
        let scores = agent.predict(&obs);
        let action = agent.choose_action(&obs);

        let mut best = 0;
        for i in 1..3 {
            if scores[i] > scores[best] {
                best = i;
            }
        }
        assert_eq!(action.index(), best);
    }

    #[test]
    fn test_observe_stores_and_trains() {
        let mut agent = test_agent();

        let loss = agent.observe(transition(1.0, false));

        assert_eq!(agent.replay_len(), 1);
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }

    #[test]
    fn test_consolidate_on_empty_buffer() {
        let mut agent = test_agent();
        assert_eq!(agent.consolidate(), 0.0);
    }

    #[test]
    fn test_consolidate_with_partial_buffer() {
        let mut agent = test_agent();
        for i in 0..3 {
            agent.observe(transition(i as f32, false));
        }

        // Fewer transitions than batch_size: trains on all of them
        let loss = agent.consolidate();
        assert!(loss.is_finite());
    }

    #[test]
    fn test_terminal_target_is_raw_reward() {
        // A single terminal transition with zero reward drives the
        // taken action's Q-value toward zero; the loss must be finite
        // and the update must not panic
        let mut agent = test_agent();
        let loss = agent.observe(transition(-15.0, true));
        assert!(loss.is_finite());
    }

    #[test]
    fn test_finish_episode_updates_stats() {
        let mut agent = test_agent();

        agent.finish_episode(3);
        agent.finish_episode(7);
        agent.finish_episode(5);

        let stats = agent.stats();
        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.record, 7);
        assert_eq!(stats.total_score, 15);
        assert!((stats.mean_score - 5.0).abs() < 1e-6);
        assert_eq!(stats.recent_scores, vec![3, 7, 5]);
    }

    #[test]
    fn test_training_reduces_loss_on_fixed_target() {
        let mut agent = test_agent();
        let t = transition(5.0, true);

        let first_loss = agent.observe(t.clone());
        let mut last_loss = first_loss;
        for _ in 0..50 {
            last_loss = agent.observe(t.clone());
        }

        assert!(
            last_loss < first_loss,
            "loss should shrink on a repeated fixed target: {} -> {}",
            first_loss,
            last_loss
        );
    }
}
