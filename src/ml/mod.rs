// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All network, optimisation and inference code lives here.
//
//   model.rs      — HandNet: ReLU hidden stack, dropout,
//                   linear output, softmax at inference
//
//   schedule.rs   — staircase learning-rate decay
//
//   evaluator.rs  — argmax accuracy over a window and
//                   progress / ETA reporting
//
//   trainer.rs    — the Adam loop with periodic held-out
//                   evaluation and best-checkpoint retention
//
//   inferencer.rs — loads a checkpoint and answers single
//                   feature vectors

use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};

/// Feed-forward hand-class network
pub mod model;

/// Learning-rate schedule keyed off the step counter
pub mod schedule;

/// Accuracy and progress reporting
pub mod evaluator;

/// Training loop with checkpointing
pub mod trainer;

/// Checkpoint-backed predictor
pub mod inferencer;

/// Backend with gradient tracking, used while training.
pub type TrainBackend = Autodiff<NdArray>;

/// Plain CPU backend for evaluation, checkpoints and serving.
pub type InferBackend = NdArray;

pub fn device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}
