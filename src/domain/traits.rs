// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The bot only ever needs one capability from a trained
// network: turn a feature vector into a distribution over
// hand classes. Anything that can do that implements
// HandPredictor, whether it is backed by a checkpoint on disk
// or something else entirely.

use crate::error::Result;

// ─── HandPredictor ────────────────────────────────────────────────────────────
/// Estimates how likely each hand class is, given the encoded
/// state of one street.
///
/// Implementations:
///   - Predictor → a trained network loaded from a checkpoint
pub trait HandPredictor {
    /// Number of values `evaluate` expects.
    fn feature_count(&self) -> usize;

    /// Number of classes in the returned distribution.
    fn class_count(&self) -> usize;

    /// Probability per class, summing to 1.
    fn evaluate(&self, features: &[f32]) -> Result<Vec<f32>>;

    /// Class indices paired with their probability, most likely first.
    fn ranked(&self, features: &[f32]) -> Result<Vec<(usize, f32)>> {
        Ok(rank(&self.evaluate(features)?))
    }
}

/// Pair each probability with its index and sort descending.
/// NaNs sink to the end.
pub fn rank(distribution: &[f32]) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = distribution.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _                      => Some((i, v)),
        })
        .map(|(i, _)| i)
}
