use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::split::SplitStrategy;
use crate::nn::model::ModelConfig;
use crate::train::classifier::TrainConfig;

/// Settings for one load → split → fit → score run.
///
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```json
/// {
///   "split": { "kind": "random", "train_fraction": 0.6, "val_fraction": 0.2, "seed": 1 },
///   "model": { "hidden": 32 },
///   "train": { "max_epochs": 100, "patience": 10 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Used only when the dataset file carries no masks.
    pub split: SplitStrategy,
    pub model: ModelConfig,
    pub train: TrainConfig,
    /// Add reverse edges before partitioning.
    pub undirected: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            split: SplitStrategy::default(),
            model: ModelConfig::default(),
            train: TrainConfig::default(),
            undirected: true,
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
