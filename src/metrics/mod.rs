//! Metrics collection for training runs

pub mod training_stats;

pub use training_stats::TrainingStats;
