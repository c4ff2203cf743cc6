// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one training run in order:
//
//   Step 1: Load features and labels   (Layer 4 - data, cached)
//   Step 2: Check expected widths      (Layer 4 - data)
//   Step 3: Partition train / held-out (Layer 4 - data)
//   Step 4: Prepare checkpoint dir     (Layer 6 - infra)
//   Step 5: Save config + architecture (Layer 6 - infra)
//   Step 6: Run the training loop      (Layer 5 - ml)

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::Dataset, splitter::Partition};
use crate::error::PipelineError;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    model::{HandNetConfig, WeightInit},
    trainer::{run_training, TrainingResult},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Written next to the
// checkpoint as train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub features_path:   PathBuf,
    pub labels_path:     PathBuf,
    pub output_dir:      PathBuf,
    pub name:            String,
    pub batch_size:      usize,
    /// Fractional epochs are allowed.
    pub epochs:          f64,
    /// Trailing rows held out for evaluation.
    pub test_size:       usize,
    pub learning_rate:   f64,
    pub decay_rate:      f64,
    /// 0 keeps the learning rate constant.
    pub decay_steps:     usize,
    /// Dropout keep probability on hidden activations.
    pub keep_prob:       f64,
    /// Evaluate every this many steps; 0 means only at the end.
    pub update_interval: usize,
    pub hidden_ratio:    f64,
    pub hidden_layers:   usize,
    pub weight_init:     WeightInit,
    pub bias_init:       f64,
    pub feature_count:   Option<usize>,
    pub class_count:     Option<usize>,
    pub use_cache:       bool,
    /// Abort the run when a checkpoint cannot be written.
    pub halt_on_persistence_error: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            features_path:   PathBuf::from("features.txt"),
            labels_path:     PathBuf::from("labels.txt"),
            output_dir:      PathBuf::from("checkpoints"),
            name:            "preflop".to_string(),
            batch_size:      100,
            epochs:          5.0,
            test_size:       10_000,
            learning_rate:   1e-4,
            decay_rate:      0.96,
            decay_steps:     10_000,
            keep_prob:       0.8,
            update_interval: 1_000,
            hidden_ratio:    0.66,
            hidden_layers:   1,
            weight_init:     WeightInit::Xavier,
            bias_init:       0.1,
            feature_count:   None,
            class_count:     None,
            use_cache:       true,
            halt_on_persistence_error: true,
        }
    }
}

impl TrainConfig {
    /// Reject hyperparameters the training loop cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        let invalid = |msg: String| Err(PipelineError::InvalidConfig(msg));

        if self.batch_size == 0 {
            return invalid("batch_size must be at least 1".into());
        }
        if !(self.keep_prob > 0.0 && self.keep_prob <= 1.0) {
            return invalid(format!("keep_prob must be in (0, 1], got {}", self.keep_prob));
        }
        if !self.epochs.is_finite() || self.epochs < 0.0 {
            return invalid(format!("epochs must be a finite non-negative number, got {}", self.epochs));
        }
        if !(self.learning_rate > 0.0) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if !(self.decay_rate > 0.0) {
            return invalid(format!("decay_rate must be positive, got {}", self.decay_rate));
        }
        Ok(())
    }

    /// Architecture for a dataset with the given widths.
    pub fn network(&self, feature_count: usize, class_count: usize) -> HandNetConfig {
        HandNetConfig::new(feature_count, class_count, self.hidden_ratio)
            .with_hidden_layers(self.hidden_layers)
            .with_init(self.weight_init)
            .with_bias_init(self.bias_init)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainingResult> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load dataset ──────────────────────────────────────────────
        tracing::info!(
            "Loading features '{}' and labels '{}'",
            cfg.features_path.display(),
            cfg.labels_path.display(),
        );
        let dataset = Dataset::load(&cfg.features_path, &cfg.labels_path, cfg.use_cache)
            .context("failed to load training data")?;
        tracing::info!(
            "Loaded {} rows ({} features, {} classes)",
            dataset.len(),
            dataset.feature_count(),
            dataset.class_count(),
        );

        // ── Step 2: Check expected widths ─────────────────────────────────────
        dataset.check_widths(
            cfg.feature_count.unwrap_or(dataset.feature_count()),
            cfg.class_count.unwrap_or(dataset.class_count()),
        )?;

        // ── Step 3: Partition ─────────────────────────────────────────────────
        let partition = Partition::positional(dataset.len(), cfg.test_size)?;

        // ── Step 4: Checkpoint directory ──────────────────────────────────────
        let mut ckpt_manager = CheckpointManager::create(&cfg.output_dir, &cfg.name)
            .context("failed to prepare checkpoint directory")?;

        // ── Step 5: Save config and architecture ──────────────────────────────
        let net_cfg = cfg.network(dataset.feature_count(), dataset.class_count());
        ckpt_manager.save_config(cfg)?;
        ckpt_manager.save_network(&net_cfg)?;

        let metrics = match MetricsLogger::new(ckpt_manager.dir()) {
            Ok(logger) => Some(logger),
            Err(e) => {
                tracing::warn!("Metrics disabled: {e}");
                None
            }
        };

        // ── Step 6: Train ─────────────────────────────────────────────────────
        let result = run_training(cfg, &net_cfg, &dataset, partition, &mut ckpt_manager, metrics.as_ref())?;
        Ok(result)
    }
}
