pub mod train;

pub use train::{shape_reward, TrainConfig, TrainMode};
