// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Holds one trained network per name (normally one per
// street) and answers feature vectors by name. Loaded once,
// read-only afterwards.

use std::{collections::BTreeMap, path::Path};

use anyhow::{anyhow, Context, Result};

use crate::data::{dataset::Dataset, splitter::Partition};
use crate::domain::{street::Street, traits::HandPredictor};
use crate::infra::checkpoint::{CheckpointKind, CheckpointManager};
use crate::ml::{evaluator::evaluate_window, inferencer::Predictor};

#[derive(Default)]
pub struct PredictorRegistry {
    predictors: BTreeMap<String, Predictor>,
}

impl PredictorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, predictor: Predictor) {
        self.predictors.insert(name.into(), predictor);
    }

    pub fn get(&self, name: &str) -> Option<&Predictor> {
        self.predictors.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predictors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.predictors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictors.is_empty()
    }

    /// Load `<root>/<name>` for every name; any missing checkpoint is an error.
    pub fn load<S: AsRef<str>>(root: impl AsRef<Path>, names: &[S], kind: CheckpointKind) -> Result<Self> {
        let root     = root.as_ref();
        let mut reg  = Self::new();
        for name in names {
            let name    = name.as_ref();
            let manager = CheckpointManager::open(root, name);
            let predictor = Predictor::from_checkpoint(&manager, kind)
                .with_context(|| format!("failed to load predictor '{name}'"))?;
            reg.insert(name, predictor);
        }
        Ok(reg)
    }

    /// Load each street whose checkpoint exists under `root`, skipping the rest.
    pub fn load_streets(root: impl AsRef<Path>, kind: CheckpointKind) -> Result<Self> {
        let root    = root.as_ref();
        let mut reg = Self::new();
        for street in Street::ALL {
            let manager = CheckpointManager::open(root, street.name());
            if !manager.has_model(kind) {
                tracing::debug!("No {street} checkpoint under '{}'", root.display());
                continue;
            }

            let predictor = Predictor::from_checkpoint(&manager, kind)
                .with_context(|| format!("failed to load {street} predictor"))?;
            if let Some(expected) = street.expected_features() {
                if predictor.feature_count() != expected {
                    tracing::warn!(
                        "{street} network takes {} features, expected {expected}",
                        predictor.feature_count(),
                    );
                }
            }
            reg.insert(street.name(), predictor);
        }
        tracing::info!("Loaded {} street predictor(s)", reg.len());
        Ok(reg)
    }

    /// Distribution over hand classes from the network called `name`.
    pub fn evaluate(&self, name: &str, features: &[f32]) -> Result<Vec<f32>> {
        let predictor = self.get(name).ok_or_else(|| anyhow!("no predictor named '{name}'"))?;
        Ok(predictor.evaluate(features)?)
    }
}

// ─── Held-out Evaluation ─────────────────────────────────────────────────────
/// Accuracy of a saved checkpoint on the trailing `test_size` rows of a dataset.
pub fn evaluate_checkpoint(
    features:  &Path,
    labels:    &Path,
    manager:   &CheckpointManager,
    kind:      CheckpointKind,
    test_size: usize,
    use_cache: bool,
) -> Result<f64> {
    let predictor = Predictor::from_checkpoint(manager, kind)
        .with_context(|| format!("failed to load checkpoint from '{}'", manager.dir().display()))?;
    let dataset = Dataset::load(features, labels, use_cache).context("failed to load evaluation data")?;
    dataset.check_widths(predictor.feature_count(), predictor.class_count())?;

    let partition = Partition::positional(dataset.len(), test_size)?;
    let accuracy  = evaluate_window(predictor.model(), &dataset, partition.test, &crate::ml::device());
    tracing::info!("Held-out accuracy over {} rows: {:.4}", partition.test.len(), accuracy);
    Ok(accuracy)
}
