//! Bounded experience replay for the DQN agent
//!
//! The store is a ring buffer with an explicit capacity and write
//! cursor: once full, an append overwrites the oldest slot, giving
//! FIFO eviction without any library-provided side effects.

use rand::Rng;

use super::observation::Observation;
use crate::game::TurnAction;

/// One (state, action, reward, next state, terminal) tuple, the atomic
/// unit of learning. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Observation,
    pub action: TurnAction,
    pub reward: f32,
    pub next_state: Observation,
    pub terminal: bool,
}

/// Bounded FIFO store of transitions
pub struct ReplayBuffer {
    slots: Vec<Transition>,
    /// Next slot to overwrite once the buffer is full
    cursor: usize,
    capacity: usize,
}

impl ReplayBuffer {
    /// Create a buffer holding at most `capacity` transitions
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Append a transition, evicting the oldest one at capacity
    pub fn push(&mut self, transition: Transition) {
        if self.slots.len() < self.capacity {
            self.slots.push(transition);
        } else {
            self.slots[self.cursor] = transition;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
    }

    /// Number of stored transitions
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sample `n` transitions uniformly at random without replacement.
    ///
    /// When fewer than `n` transitions are stored this returns all of
    /// them (possibly none); asking for more than is available is not
    /// an error.
    pub fn sample<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Transition> {
        if self.slots.len() <= n {
            return self.slots.clone();
        }

        rand::seq::index::sample(rng, self.slots.len(), n)
            .iter()
            .map(|i| self.slots[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    fn transition(reward: f32) -> Transition {
        Transition {
            state: [0.0; 28],
            action: TurnAction::Straight,
            reward,
            next_state: [0.0; 28],
            terminal: false,
        }
    }

    #[test]
    fn test_push_and_len() {
        let mut buffer = ReplayBuffer::new(10);
        assert!(buffer.is_empty());

        buffer.push(transition(1.0));
        buffer.push(transition(2.0));

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.capacity(), 10);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = ReplayBuffer::new(5);
        for i in 0..20 {
            buffer.push(transition(i as f32));
            assert!(buffer.len() <= 5);
        }
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = ReplayBuffer::new(3);
        for i in 0..4 {
            buffer.push(transition(i as f32));
        }

        // Capacity-many draws return the whole store; the oldest entry
        // (reward 0.0) must have been overwritten
        let all = buffer.sample(3, &mut thread_rng());
        let rewards: Vec<f32> = all.iter().map(|t| t.reward).collect();
        assert_eq!(all.len(), 3);
        assert!(!rewards.contains(&0.0));
        assert!(rewards.contains(&1.0));
        assert!(rewards.contains(&2.0));
        assert!(rewards.contains(&3.0));
    }

    #[test]
    fn test_sample_from_empty_buffer() {
        let buffer = ReplayBuffer::new(10);
        let sampled = buffer.sample(5, &mut thread_rng());
        assert!(sampled.is_empty());
    }

    #[test]
    fn test_sample_more_than_stored_returns_all() {
        let mut buffer = ReplayBuffer::new(10);
        for i in 0..4 {
            buffer.push(transition(i as f32));
        }

        let sampled = buffer.sample(8, &mut thread_rng());
        assert_eq!(sampled.len(), 4);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut buffer = ReplayBuffer::new(100);
        for i in 0..100 {
            buffer.push(transition(i as f32));
        }

        let sampled = buffer.sample(50, &mut thread_rng());
        assert_eq!(sampled.len(), 50);

        let mut rewards: Vec<i64> = sampled.iter().map(|t| t.reward as i64).collect();
        rewards.sort_unstable();
        rewards.dedup();
        assert_eq!(rewards.len(), 50, "sampling must not repeat transitions");
    }
}
