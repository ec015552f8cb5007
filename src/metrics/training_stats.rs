//! Training statistics tracking
//!
//! Rolling-window episode metrics (shaped reward, length, score) and
//! TD-loss values for progress reporting during training.

use std::collections::VecDeque;

/// Training statistics tracker with rolling averages
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Shaped episode rewards (rolling window)
    episode_rewards: VecDeque<f32>,

    /// Episode lengths in ticks (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Episode scores (food eaten) (rolling window)
    episode_scores: VecDeque<u32>,

    /// TD losses from the long-memory updates (rolling window)
    td_losses: VecDeque<f32>,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total number of environment ticks taken
    total_steps: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker keeping the last `window_size` values
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            td_losses: VecDeque::with_capacity(window_size),
            total_episodes: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    pub fn record_episode(&mut self, reward: f32, length: usize, score: u32) {
        Self::push_window(&mut self.episode_rewards, reward, self.window_size);
        Self::push_window(&mut self.episode_lengths, length, self.window_size);
        Self::push_window(&mut self.episode_scores, score, self.window_size);
        self.total_episodes += 1;
        self.total_steps += length;
    }

    /// Record the TD loss of a learning update
    pub fn record_loss(&mut self, loss: f32) {
        Self::push_window(&mut self.td_losses, loss, self.window_size);
    }

    /// Mean shaped reward over the rolling window
    pub fn mean_episode_reward(&self) -> f32 {
        Self::mean_f32(&self.episode_rewards)
    }

    /// Mean episode length over the rolling window
    pub fn mean_episode_length(&self) -> f32 {
        if self.episode_lengths.is_empty() {
            return 0.0;
        }
        self.episode_lengths.iter().sum::<usize>() as f32 / self.episode_lengths.len() as f32
    }

    /// Mean score over the rolling window
    pub fn mean_score(&self) -> f32 {
        if self.episode_scores.is_empty() {
            return 0.0;
        }
        self.episode_scores.iter().sum::<u32>() as f32 / self.episode_scores.len() as f32
    }

    /// Best score inside the rolling window
    pub fn window_best_score(&self) -> u32 {
        self.episode_scores.iter().copied().max().unwrap_or(0)
    }

    /// Mean TD loss over the rolling window
    pub fn mean_loss(&self) -> f32 {
        Self::mean_f32(&self.td_losses)
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// One-line summary for progress logging
    pub fn format_summary(&self) -> String {
        format!(
            "score {:.2} (best {}) | reward {:.1} | len {:.0} | loss {:.4}",
            self.mean_score(),
            self.window_best_score(),
            self.mean_episode_reward(),
            self.mean_episode_length(),
            self.mean_loss(),
        )
    }

    fn push_window<T>(window: &mut VecDeque<T>, value: T, size: usize) {
        if window.len() == size {
            window.pop_front();
        }
        window.push_back(value);
    }

    fn mean_f32(values: &VecDeque<f32>) -> f32 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f32>() / values.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.mean_score(), 0.0);
        assert_eq!(stats.mean_episode_reward(), 0.0);
        assert_eq!(stats.window_best_score(), 0);
        assert_eq!(stats.mean_loss(), 0.0);
    }

    #[test]
    fn test_record_episode() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(15.5, 150, 5);

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_steps(), 150);
        assert!((stats.mean_episode_reward() - 15.5).abs() < 1e-6);
        assert_eq!(stats.mean_score(), 5.0);
    }

    #[test]
    fn test_rolling_window_evicts() {
        let mut stats = TrainingStats::new(2);
        stats.record_episode(1.0, 10, 1);
        stats.record_episode(2.0, 10, 2);
        stats.record_episode(3.0, 10, 3);

        // Window holds the last two, totals keep counting
        assert!((stats.mean_episode_reward() - 2.5).abs() < 1e-6);
        assert_eq!(stats.window_best_score(), 3);
        assert_eq!(stats.total_episodes(), 3);
        assert_eq!(stats.total_steps(), 30);
    }

    #[test]
    fn test_record_loss() {
        let mut stats = TrainingStats::new(100);
        stats.record_loss(0.5);
        stats.record_loss(0.3);
        assert!((stats.mean_loss() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_format_summary_contains_score() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(10.0, 50, 7);
        let summary = stats.format_summary();
        assert!(summary.contains("7.00"));
        assert!(summary.contains("best 7"));
    }
}
