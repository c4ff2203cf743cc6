// ============================================================
// Layer 4 — Train / Held-out Partition
// ============================================================
// Splits the dataset by position, not at random:
//
//   row 0                        N-T                N
//   ├──────── training ──────────┼──── held-out ────┤
//
// The trailing T rows never appear in a training batch, so
// accuracy on them measures generalisation. Because the split
// is positional, the same files always give the same split.

use crate::data::dataset::Window;
use crate::error::Result;

/// Contiguous, non-overlapping training and held-out windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub train: Window,
    pub test:  Window,
}

impl Partition {
    /// Hold out the last `test_size` of `len` rows.
    ///
    /// Fails with `EmptyWindow` if either side would have no rows.
    pub fn positional(len: usize, test_size: usize) -> Result<Self> {
        let boundary = len.saturating_sub(test_size);
        let train    = Window::new("training", 0, boundary)?;
        let test     = Window::new("held-out", boundary, len)?;

        tracing::debug!(
            "Partition: {} training rows, {} held-out rows",
            train.len(),
            test.len(),
        );

        Ok(Self { train, test })
    }
}
