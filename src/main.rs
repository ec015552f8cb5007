use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use dqn_snake::game::GameConfig;
use dqn_snake::modes::{TrainConfig, TrainMode};
use dqn_snake::rl::{default_device, TrainingBackend};

#[derive(Parser)]
#[command(name = "dqn_snake")]
#[command(version, about = "Snake game with a DQN reinforcement learning agent")]
struct Cli {
    /// Execution mode
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// Grid width
    #[arg(long, default_value = "30")]
    width: usize,

    /// Grid height
    #[arg(long, default_value = "30")]
    height: usize,

    /// Number of training episodes
    #[arg(long, default_value = "10000")]
    episodes: usize,

    /// Model path for saving and resuming
    #[arg(long, default_value = "models/snake.mpk")]
    model: PathBuf,

    /// Resume training from the model path if it exists
    #[arg(long)]
    resume: bool,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train the DQN agent
    Train,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.mode {
        Mode::Train => {
            let mut config = TrainConfig::new(cli.episodes, cli.model);
            config.game_config = GameConfig::new(cli.width, cli.height);
            config.resume = cli.resume;

            let device = default_device();
            let mut train_mode = TrainMode::<TrainingBackend>::new(config, device)?;
            train_mode.run()?;
        }
    }

    Ok(())
}
