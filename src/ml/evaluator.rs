// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Held-out accuracy: the fraction of rows whose most likely
// predicted class equals the most likely label class.
//
//   accuracy = #{ argmax(prediction) == argmax(label) } / rows
//
// Softmax is monotonic, so comparing raw logits gives the same
// argmax as comparing probabilities. Dropout is always off here.

use std::{fmt, time::Duration};

use burn::prelude::*;

use crate::data::{
    batcher::RowBatcher,
    dataset::{Dataset, Window},
};
use crate::ml::model::HandNet;

/// Rows per forward pass when scoring a window.
pub const EVAL_CHUNK: usize = 4096;

/// Number of rows where predicted and labelled argmax agree.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 2>) -> usize {
    // argmax(1) returns [batch, 1]; flatten to [batch] before comparing
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    let actual    = labels.argmax(1).flatten::<1>(0, 1);
    predicted.equal(actual).int().sum().into_scalar().elem::<i64>() as usize
}

/// Accuracy of `model` over every row of `window`, in `[0, 1]`.
pub fn evaluate_window<B: Backend>(
    model:   &HandNet<B>,
    dataset: &Dataset,
    window:  Window,
    device:  &B::Device,
) -> f64 {
    let batcher = RowBatcher::<B>::new(device.clone());
    let mut correct = 0usize;

    let mut start = window.start();
    while start < window.end() {
        let end   = (start + EVAL_CHUNK).min(window.end());
        let batch = batcher.batch(dataset, start..end);
        correct  += count_correct(model.forward(batch.features, 1.0), batch.labels);
        start     = end;
    }

    correct as f64 / window.len() as f64
}

// ─── Progress ─────────────────────────────────────────────────────────────────
/// Snapshot reported after each evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub done:     usize,
    pub total:    usize,
    pub accuracy: f64,
    pub best:     f64,
    pub elapsed:  Duration,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 { 1.0 } else { self.done as f64 / self.total as f64 }
    }

    /// `elapsed / done * remaining`. Noisy for small `done`.
    pub fn eta(&self) -> Duration {
        if self.done == 0 {
            return Duration::ZERO;
        }
        let remaining = self.total.saturating_sub(self.done);
        self.elapsed.div_f64(self.done as f64).mul_f64(remaining as f64)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>5.1}% | step {}/{} | acc={:.4} | best={:.4} | eta={:.0}s",
            self.fraction() * 100.0,
            self.done,
            self.total,
            self.accuracy,
            self.best,
            self.eta().as_secs_f64(),
        )
    }
}
