// ============================================================
// Layer 4 — Row Batcher
// ============================================================
// Gathers dataset rows by index and stacks them into tensors:
//
//   Input:  row indices i₁ … iₙ
//   Output: features [n, F], labels [n, C]
//
// Rows are copied into one flat Vec per table and reshaped,
// so a batch costs a single host → device transfer per tensor.
//
// B is the Burn Backend (Autodiff<NdArray> while training,
// plain NdArray for evaluation) so the same batcher serves both.

use burn::{prelude::*, tensor::TensorData};

use crate::data::{
    dataset::{Dataset, Table, Window},
    sampler::WindowSampler,
};

// ─── RowBatch ─────────────────────────────────────────────────────────────────
/// A batch of dataset rows ready for the forward pass.
#[derive(Debug, Clone)]
pub struct RowBatch<B: Backend> {
    /// shape: [batch_size, feature_count]
    pub features: Tensor<B, 2>,

    /// shape: [batch_size, class_count]
    pub labels: Tensor<B, 2>,
}

impl<B: Backend> RowBatch<B> {
    pub fn len(&self) -> usize {
        self.features.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── RowBatcher ───────────────────────────────────────────────────────────────
/// Holds the target device so tensors land where the model lives.
#[derive(Clone, Debug)]
pub struct RowBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> RowBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack the rows at `indices` into a batch.
    pub fn batch(&self, dataset: &Dataset, indices: impl IntoIterator<Item = usize>) -> RowBatch<B> {
        let indices: Vec<usize> = indices.into_iter().collect();
        RowBatch {
            features: self.stack(dataset.features(), &indices),
            labels:   self.stack(dataset.labels(), &indices),
        }
    }

    /// Every row of a window, in order.
    pub fn window(&self, dataset: &Dataset, window: Window) -> RowBatch<B> {
        self.batch(dataset, window.start()..window.end())
    }

    fn stack(&self, table: &Table, indices: &[usize]) -> Tensor<B, 2> {
        let width = table.width();
        let mut flat = Vec::with_capacity(indices.len() * width);
        for &i in indices {
            flat.extend_from_slice(table.row(i));
        }
        Tensor::from_data(TensorData::new(flat, [indices.len(), width]), &self.device)
    }
}

/// Draw the batch for `iteration` from `window`, wrapping cyclically.
pub fn next_batch<B: Backend>(
    batcher:    &RowBatcher<B>,
    dataset:    &Dataset,
    iteration:  usize,
    batch_size: usize,
    window:     Window,
) -> RowBatch<B> {
    let sampler = WindowSampler::new(window, batch_size);
    batcher.batch(dataset, sampler.indices(iteration))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn dataset() -> Dataset {
        let features = Table::new(2, (0..12).map(|v| v as f32).collect()).unwrap();
        let labels   = Table::new(1, (0..6).map(|v| v as f32 * 10.0).collect()).unwrap();
        Dataset::new(features, labels).unwrap()
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = RowBatcher::<B>::new(Default::default());
        let batch   = batcher.batch(&dataset(), [0, 2, 4]);
        assert_eq!(batch.features.dims(), [3, 2]);
        assert_eq!(batch.labels.dims(), [3, 1]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_next_batch_wraps_window() {
        let ds      = dataset();
        let batcher = RowBatcher::<B>::new(Default::default());
        let window  = Window::new("training", 1, 4).unwrap();

        // iteration 1, batch 2 → logical 2,3 → rows 3, 1
        let batch  = next_batch(&batcher, &ds, 1, 2, window);
        let labels = batch.labels.into_data().to_vec::<f32>().unwrap();
        assert_eq!(labels, vec![30.0, 10.0]);
    }
}
