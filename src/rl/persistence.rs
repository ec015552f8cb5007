//! Model persistence for saving and loading trained agents
//!
//! Weights go through Burn's record system; a JSON sidecar carries the
//! network shape descriptor and the non-network training statistics.
//! The shape descriptor is what lets a loader detect weights trained
//! for a different observation layout and fall back to a fresh network
//! instead of crashing.

use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::dqn::DqnAgent;
use super::network::{QNetwork, QNetworkConfig};

/// Metadata saved alongside the model weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Shape of the persisted network (input, hidden, action sizes)
    pub shape: QNetworkConfig,

    /// Games completed when the model was saved
    pub n_games: usize,

    /// Best score reached
    pub record: u32,

    /// Exploration rate at save time
    pub epsilon: f32,

    /// Sum of all scores, for the running mean
    pub total_score: u32,

    /// Crate version that wrote the file
    pub version: String,
}

impl ModelMetadata {
    pub fn new(
        shape: QNetworkConfig,
        n_games: usize,
        record: u32,
        epsilon: f32,
        total_score: u32,
    ) -> Self {
        Self {
            shape,
            n_games,
            record,
            epsilon,
            total_score,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Outcome of loading persisted weights against an expected shape
pub enum LoadOutcome<B: AutodiffBackend> {
    /// Weights matched the expected shape and were loaded
    Loaded {
        network: QNetwork<B>,
        metadata: ModelMetadata,
    },
    /// Weights were written for a different shape; only the metadata
    /// is usable
    ShapeMismatch { metadata: ModelMetadata },
}

/// Save an agent's network weights and metadata.
///
/// Two files are written:
/// - `<path>` - network weights (Burn record format)
/// - `<path>.meta.json` - metadata as JSON
pub fn save_agent<B: AutodiffBackend>(agent: &DqnAgent<B>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let record = agent.network().clone().into_record();
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(record, path.to_path_buf())
        .context("Failed to save network weights")?;

    let stats = agent.stats();
    let metadata = ModelMetadata::new(
        agent.network_config(),
        stats.games_played,
        stats.record,
        stats.epsilon,
        stats.total_score,
    );

    let meta_path = path.with_extension("meta.json");
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Load persisted weights, checking the shape descriptor first.
///
/// A shape mismatch is reported through the `LoadOutcome`, not as an
/// error: missing or unreadable files are errors, incompatible but
/// well-formed saves are not.
pub fn load_network<B: AutodiffBackend>(
    path: &Path,
    expected: &QNetworkConfig,
    device: &B::Device,
) -> Result<LoadOutcome<B>> {
    let meta_path = path.with_extension("meta.json");
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: ModelMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    if !expected.is_compatible(&metadata.shape) {
        return Ok(LoadOutcome::ShapeMismatch { metadata });
    }

    let mut network = metadata.shape.init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;
    network = network.load_record(record);

    Ok(LoadOutcome::Loaded { network, metadata })
}
