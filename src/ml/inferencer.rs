// ============================================================
// Layer 5 — Inferencer
// ============================================================
use burn::{prelude::*, tensor::TensorData};

use crate::domain::traits::HandPredictor;
use crate::error::{PipelineError, Result};
use crate::infra::checkpoint::{CheckpointKind, CheckpointManager};
use crate::ml::{model::HandNet, InferBackend};

/// A trained network loaded read-only for answering queries.
pub struct Predictor {
    model:  HandNet<InferBackend>,
    device: <InferBackend as Backend>::Device,
}

impl Predictor {
    pub fn new(model: HandNet<InferBackend>) -> Self {
        Self { model, device: crate::ml::device() }
    }

    /// Rebuild the architecture from `network.json` and load the chosen parameters.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, kind: CheckpointKind) -> Result<Self> {
        let device    = crate::ml::device();
        let model_cfg = ckpt_manager.load_network()?;
        let model: HandNet<InferBackend> = model_cfg.init(&device)?;
        let model = ckpt_manager.load_model(model, kind, &device)?;
        tracing::info!(
            "Model loaded from '{}' ({} features → {} classes)",
            ckpt_manager.dir().display(),
            model_cfg.feature_count,
            model_cfg.class_count,
        );
        Ok(Self { model, device })
    }

    pub fn model(&self) -> &HandNet<InferBackend> {
        &self.model
    }
}

impl HandPredictor for Predictor {
    fn feature_count(&self) -> usize {
        self.model.feature_count()
    }

    fn class_count(&self) -> usize {
        self.model.class_count()
    }

    fn evaluate(&self, features: &[f32]) -> Result<Vec<f32>> {
        let expected = self.feature_count();
        if features.len() != expected {
            return Err(PipelineError::shape("feature vector", expected, features.len()));
        }

        let input = Tensor::<InferBackend, 2>::from_data(
            TensorData::new(features.to_vec(), [1, expected]),
            &self.device,
        );
        self.model
            .predict(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| PipelineError::Tensor(format!("{e:?}")))
    }
}
