// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores one named network's parameters and the
// metadata needed to rebuild it.
//
// Directory layout for `<output_dir>/<name>/`:
//
//   best.mpk            ← parameters at the best held-out accuracy
//   final.mpk           ← parameters when the run finished
//   accuracy.txt        ← best held-out accuracy, as a decimal
//   network.json        ← HandNetConfig (architecture)
//   train_config.json   ← hyperparameters of the run
//   metrics.csv         ← evaluation log (infra::metrics)
//
// Parameters are written with Burn's NamedMpkFileRecorder at
// full precision, so a reload reproduces predictions exactly.

use std::{
    fs,
    path::{Path, PathBuf},
};

use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::error::{PipelineError, Result};
use crate::ml::{
    model::{HandNet, HandNetConfig},
    trainer::CheckpointSink,
    InferBackend,
};

const ACCURACY_FILE: &str = "accuracy.txt";
const NETWORK_FILE: &str = "network.json";
const CONFIG_FILE: &str = "train_config.json";

/// Which parameter snapshot to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointKind {
    Best,
    Final,
}

impl CheckpointKind {
    fn stem(self) -> &'static str {
        match self {
            CheckpointKind::Best  => "best",
            CheckpointKind::Final => "final",
        }
    }
}

/// Manages saving and loading for a single named network.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Address `<output_dir>/<name>`, creating the directory.
    pub fn create(output_dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let manager = Self::open(output_dir, name);
        fs::create_dir_all(&manager.dir).map_err(|e| PipelineError::persistence(&manager.dir, e))?;
        Ok(manager)
    }

    /// Address `<output_dir>/<name>` without touching the filesystem.
    pub fn open(output_dir: impl AsRef<Path>, name: &str) -> Self {
        Self { dir: output_dir.as_ref().join(name) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
        NamedMpkFileRecorder::new()
    }

    /// Path without extension; the recorder appends `.mpk`.
    fn model_path(&self, kind: CheckpointKind) -> PathBuf {
        self.dir.join(kind.stem())
    }

    pub fn has_model(&self, kind: CheckpointKind) -> bool {
        self.model_path(kind).with_extension("mpk").exists()
    }

    pub fn save_model<B: Backend>(&self, model: &HandNet<B>, kind: CheckpointKind) -> Result<()> {
        let path = self.model_path(kind);
        Self::recorder()
            .record(model.clone().into_record(), path.clone())
            .map_err(|e| PipelineError::persistence(&path, e))?;

        tracing::debug!("Saved {} checkpoint to '{}'", kind.stem(), path.display());
        Ok(())
    }

    /// Load saved parameters into `model`, which must have the same architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  HandNet<B>,
        kind:   CheckpointKind,
        device: &B::Device,
    ) -> Result<HandNet<B>> {
        let path   = self.model_path(kind);
        let record = Self::recorder()
            .load(path.clone(), device)
            .map_err(|e| PipelineError::persistence(&path, e))?;

        Ok(model.load_record(record))
    }

    pub fn save_accuracy(&self, accuracy: f64) -> Result<()> {
        self.write(ACCURACY_FILE, accuracy.to_string())
    }

    pub fn load_accuracy(&self) -> Result<f64> {
        let path = self.dir.join(ACCURACY_FILE);
        self.read(ACCURACY_FILE)?
            .trim()
            .parse()
            .map_err(|e| PipelineError::persistence(&path, e))
    }

    pub fn save_network(&self, cfg: &HandNetConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(cfg).map_err(|e| PipelineError::persistence(&self.dir, e))?;
        self.write(NETWORK_FILE, json)
    }

    pub fn load_network(&self) -> Result<HandNetConfig> {
        let path = self.dir.join(NETWORK_FILE);
        serde_json::from_str(&self.read(NETWORK_FILE)?).map_err(|e| PipelineError::persistence(&path, e))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(cfg).map_err(|e| PipelineError::persistence(&self.dir, e))?;
        self.write(CONFIG_FILE, json)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        serde_json::from_str(&self.read(CONFIG_FILE)?).map_err(|e| PipelineError::persistence(&path, e))
    }

    fn write(&self, file: &str, contents: String) -> Result<()> {
        let path = self.dir.join(file);
        fs::write(&path, contents).map_err(|e| PipelineError::persistence(&path, e))
    }

    fn read(&self, file: &str) -> Result<String> {
        let path = self.dir.join(file);
        fs::read_to_string(&path).map_err(|e| PipelineError::persistence(&path, e))
    }
}

impl CheckpointSink for CheckpointManager {
    fn save_best(&mut self, model: &HandNet<InferBackend>, accuracy: f64) -> Result<()> {
        self.save_model(model, CheckpointKind::Best)?;
        tracing::info!("New best accuracy {:.4}, checkpoint saved", accuracy);
        Ok(())
    }

    fn save_final(&mut self, model: &HandNet<InferBackend>, best_accuracy: f64) -> Result<()> {
        self.save_model(model, CheckpointKind::Final)?;
        self.save_accuracy(best_accuracy)
    }
}
