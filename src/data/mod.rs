// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the text files on disk and the tensors
// that reach the network:
//
//   features / labels files
//       │
//       ▼
//   loader            → parses rows (or reads the binary cache)
//       │
//       ▼
//   Dataset           → parallel feature / label tables
//       │
//       ▼
//   Partition         → training window + held-out window
//       │
//       ▼
//   WindowSampler     → cyclic row indices per iteration
//       │
//       ▼
//   RowBatcher        → stacks rows into tensor batches

/// Parses whitespace-separated numeric text files
pub mod loader;

/// In-memory tables, the paired dataset and row windows
pub mod dataset;

/// Positional training / held-out split
pub mod splitter;

/// Cyclic index traversal of a window
pub mod sampler;

/// Turns rows into tensors on a device
pub mod batcher;
