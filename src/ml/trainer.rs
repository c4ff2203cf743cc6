// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One run = a fixed number of Adam steps over the training
// window, with periodic held-out evaluation:
//
//   for step in 0..iterations:
//       batch  ← rows of the training window (cyclic)
//       loss   ← softmax cross-entropy(logits, labels)
//       params ← Adam(params, ∇loss, lr(step))
//       every update_interval steps (and at the last step):
//           acc ← accuracy on the held-out window
//           acc > best → save "best" checkpoint
//
// At the end the final parameters and the best accuracy are
// persisted and accuracy over the full dataset is reported.
//
// Key Burn insight:
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on InferBackend (no autodiff),
//     which is what evaluation and checkpointing see

use std::time::Instant;

use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::RowBatcher,
    dataset::{Dataset, Window},
    sampler::WindowSampler,
    splitter::Partition,
};
use crate::error::{PipelineError, Result};
use crate::infra::metrics::{EvalMetrics, MetricsLogger};
use crate::ml::{
    evaluator::{evaluate_window, Progress},
    model::{HandNet, HandNetConfig},
    schedule::StaircaseDecay,
    InferBackend, TrainBackend,
};

/// Where the trainer hands off parameters worth keeping.
pub trait CheckpointSink {
    /// Called whenever held-out accuracy beats every earlier evaluation.
    fn save_best(&mut self, model: &HandNet<InferBackend>, accuracy: f64) -> Result<()>;

    /// Called once after the last step.
    fn save_final(&mut self, model: &HandNet<InferBackend>, best_accuracy: f64) -> Result<()>;
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    pub iterations:       usize,
    pub best_accuracy:    f64,
    /// Held-out accuracy at the last evaluation.
    pub final_accuracy:   f64,
    /// Accuracy of the final parameters over every row, training rows included.
    pub overall_accuracy: f64,
    /// Successful "best" checkpoint writes.
    pub best_saves:       usize,
    /// "best" writes that failed while training was allowed to continue.
    pub failed_saves:     usize,
    /// Mean batch loss over the last evaluation interval.
    pub final_loss:       f64,
    pub elapsed_secs:     f64,
}

/// `floor(train_rows / batch_size * epochs)`.
pub fn iteration_count(train_rows: usize, batch_size: usize, epochs: f64) -> usize {
    let batches_per_epoch = train_rows as f64 / batch_size as f64;
    (batches_per_epoch * epochs).floor().max(0.0) as usize
}

/// Build a fresh network and train it on the CPU backend.
pub fn run_training(
    cfg:       &TrainConfig,
    net_cfg:   &HandNetConfig,
    dataset:   &Dataset,
    partition: Partition,
    sink:      &mut impl CheckpointSink,
    metrics:   Option<&MetricsLogger>,
) -> Result<TrainingResult> {
    let device = crate::ml::device();
    let model: HandNet<TrainBackend> = net_cfg.init(&device)?;
    tracing::info!(
        "Model ready: {} → {}×{} → {}",
        net_cfg.feature_count,
        net_cfg.hidden_layers,
        net_cfg.hidden_width(),
        net_cfg.class_count,
    );

    let (_, result) = train_loop(cfg, model, dataset, partition, sink, metrics, &device)?;
    Ok(result)
}

/// Train `model` in place and return it with the run summary.
pub fn train_loop(
    cfg:       &TrainConfig,
    mut model: HandNet<TrainBackend>,
    dataset:   &Dataset,
    partition: Partition,
    sink:      &mut impl CheckpointSink,
    metrics:   Option<&MetricsLogger>,
    device:    &<TrainBackend as Backend>::Device,
) -> Result<(HandNet<TrainBackend>, TrainingResult)> {
    cfg.validate()?;
    dataset.check_widths(model.feature_count(), model.class_count())?;
    if partition.test.end() > dataset.len() {
        return Err(PipelineError::shape("dataset rows", partition.test.end(), dataset.len()));
    }

    let iterations = iteration_count(partition.train.len(), cfg.batch_size, cfg.epochs);
    let schedule   = StaircaseDecay::new(cfg.learning_rate, cfg.decay_rate, cfg.decay_steps);
    let sampler    = WindowSampler::new(partition.train, cfg.batch_size);
    let batcher    = RowBatcher::<TrainBackend>::new(device.clone());

    // m = β1*m + (1-β1)*g ; v = β2*v + (1-β2)*g² ; θ = θ - lr * m / (√v + ε)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    let mut tracker = Tracker::new(iterations, partition.test);
    tracing::info!(
        "Training for {} iterations (batch {}, {} training rows, {} held out)",
        iterations,
        cfg.batch_size,
        partition.train.len(),
        partition.test.len(),
    );

    for step in 0..iterations {
        let batch = batcher.batch(dataset, sampler.indices(step));
        let (loss, _) = model.forward_loss(batch.features, batch.labels, cfg.keep_prob);
        tracker.add_loss(loss.clone().into_scalar().elem::<f64>());

        let lr    = schedule.rate_at(step);
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        model     = optim.step(lr, model, grads);

        let done = step + 1;
        let due  = cfg.update_interval > 0 && done % cfg.update_interval == 0;
        if due || done == iterations {
            tracker.evaluate(cfg, &model.valid(), dataset, done, lr, sink, metrics, device)?;
        }
    }

    if iterations == 0 {
        tracing::warn!("Zero iterations requested; evaluating initial parameters only");
        tracker.evaluate(cfg, &model.valid(), dataset, 0, schedule.rate_at(0), sink, metrics, device)?;
    }

    let valid = model.valid();
    let best  = tracker.best.unwrap_or(0.0);
    match sink.save_final(&valid, best) {
        Ok(()) => {}
        Err(e) if !cfg.halt_on_persistence_error => {
            tracing::error!("Final checkpoint not saved: {e}");
        }
        Err(e) => return Err(e),
    }

    let everything = Window::new("full dataset", 0, dataset.len())?;
    let overall    = evaluate_window(&valid, dataset, everything, device);

    let result = TrainingResult {
        iterations,
        best_accuracy:    best,
        final_accuracy:   tracker.last_accuracy,
        overall_accuracy: overall,
        best_saves:       tracker.best_saves,
        failed_saves:     tracker.failed_saves,
        final_loss:       tracker.last_loss,
        elapsed_secs:     tracker.started.elapsed().as_secs_f64(),
    };
    tracing::info!(
        "Training complete: best={:.4} final={:.4} overall={:.4} in {:.1}s",
        result.best_accuracy,
        result.final_accuracy,
        result.overall_accuracy,
        result.elapsed_secs,
    );
    Ok((model, result))
}

// ─── Tracker ──────────────────────────────────────────────────────────────────
/// Mutable state of a run besides the parameters themselves.
struct Tracker {
    iterations:    usize,
    held_out:      Window,
    started:       Instant,
    best:          Option<f64>,
    best_saves:    usize,
    failed_saves:  usize,
    last_accuracy: f64,
    last_loss:     f64,
    loss_sum:      f64,
    loss_count:    usize,
}

impl Tracker {
    fn new(iterations: usize, held_out: Window) -> Self {
        Self {
            iterations,
            held_out,
            started:       Instant::now(),
            best:          None,
            best_saves:    0,
            failed_saves:  0,
            last_accuracy: 0.0,
            last_loss:     f64::NAN,
            loss_sum:      0.0,
            loss_count:    0,
        }
    }

    fn add_loss(&mut self, loss: f64) {
        self.loss_sum   += loss;
        self.loss_count += 1;
    }

    #[allow(clippy::too_many_arguments)]
    fn evaluate(
        &mut self,
        cfg:     &TrainConfig,
        model:   &HandNet<InferBackend>,
        dataset: &Dataset,
        done:    usize,
        lr:      f64,
        sink:    &mut impl CheckpointSink,
        metrics: Option<&MetricsLogger>,
        device:  &<InferBackend as Backend>::Device,
    ) -> Result<()> {
        let accuracy = evaluate_window(model, dataset, self.held_out, device);
        self.last_accuracy = accuracy;
        if self.loss_count > 0 {
            self.last_loss  = self.loss_sum / self.loss_count as f64;
            self.loss_sum   = 0.0;
            self.loss_count = 0;
        }

        let row = EvalMetrics {
            step:          done,
            learning_rate: lr,
            train_loss:    self.last_loss,
            accuracy,
            best_accuracy: self.best.map_or(accuracy, |b| b.max(accuracy)),
            elapsed_secs:  self.started.elapsed().as_secs_f64(),
        };

        if row.is_improvement(self.best) {
            // The best record moves even if the write fails; nothing is rolled back.
            self.best = Some(accuracy);
            match sink.save_best(model, accuracy) {
                Ok(()) => self.best_saves += 1,
                Err(e) if !cfg.halt_on_persistence_error => {
                    tracing::error!("Best checkpoint not saved, continuing: {e}");
                    self.failed_saves += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(logger) = metrics {
            if let Err(e) = logger.log(&row) {
                tracing::warn!("Could not append metrics: {e}");
            }
        }

        let progress = Progress {
            done,
            total:    self.iterations,
            accuracy,
            best:     row.best_accuracy,
            elapsed:  self.started.elapsed(),
        };
        tracing::info!("{progress} | loss={:.4} | lr={:.2e}", self.last_loss, lr);
        Ok(())
    }
}
