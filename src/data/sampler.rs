// ============================================================
// Layer 4 — Window Sampler
// ============================================================
// Maps a global iteration number onto rows of a window:
//
//   batch k covers logical positions [k·B, (k+1)·B)
//   logical position i → row  start + (i mod len)
//
// The traversal is a fixed cycle, not a shuffle: every row of
// the window is drawn equally often, and with batch size 1 any
// `len` consecutive iterations visit each row exactly once.

use crate::data::dataset::Window;

#[derive(Debug, Clone, Copy)]
pub struct WindowSampler {
    window:     Window,
    batch_size: usize,
}

impl WindowSampler {
    pub fn new(window: Window, batch_size: usize) -> Self {
        Self { window, batch_size }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Row indices of the batch for `iteration`. Always inside the window.
    pub fn indices(&self, iteration: usize) -> impl Iterator<Item = usize> {
        let len   = self.window.len();
        let start = self.window.start();
        // Reduce before multiplying so huge iteration counts cannot overflow.
        let first = ((iteration % len) * (self.batch_size % len)) % len;
        (0..self.batch_size).map(move |offset| start + (first + offset % len) % len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn window(start: usize, end: usize) -> Window {
        Window::new("training", start, end).unwrap()
    }

    #[test]
    fn test_matches_plain_modulo() {
        let s = WindowSampler::new(window(3, 10), 4);
        for iteration in 0..50 {
            let expected: Vec<usize> = (iteration * 4..(iteration + 1) * 4)
                .map(|i| 3 + i % 7)
                .collect();
            assert_eq!(s.indices(iteration).collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn test_indices_stay_inside_window() {
        for batch_size in [1, 2, 5, 13, 40] {
            let w = window(17, 29);
            let s = WindowSampler::new(w, batch_size);
            for iteration in [0, 1, 7, 1_000, usize::MAX / 3, usize::MAX] {
                assert!(s.indices(iteration).all(|i| w.contains(i)));
            }
        }
    }

    #[test]
    fn test_single_row_batches_cover_window_once() {
        let w = window(10, 22);
        let s = WindowSampler::new(w, 1);
        for offset in [0, 5, 99] {
            let seen: Vec<usize> = (offset..offset + w.len())
                .flat_map(|it| s.indices(it))
                .collect();
            let unique: HashSet<usize> = seen.iter().copied().collect();
            assert_eq!(seen.len(), w.len());
            assert_eq!(unique.len(), w.len());
        }
    }

    #[test]
    fn test_batch_larger_than_window_wraps() {
        let s = WindowSampler::new(window(0, 3), 7);
        assert_eq!(s.indices(0).collect::<Vec<_>>(), vec![0, 1, 2, 0, 1, 2, 0]);
    }
}
