// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// other layers:
//
//   checkpoint.rs    — Saving and loading network parameters
//                      with Burn's NamedMpkFileRecorder, plus
//                      the JSON / text sidecars a predictor
//                      needs to rebuild the network.
//
//   dataset_cache.rs — Binary snapshot of a parsed text table
//                      so later runs skip re-parsing.
//
//   metrics.rs       — Evaluation log as CSV, one row per
//                      held-out evaluation.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Parsed-table binary cache
pub mod dataset_cache;

/// Evaluation metrics CSV logger
pub mod metrics;
