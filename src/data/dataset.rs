use std::path::Path;

use crate::data::loader::load_table;
use crate::error::{PipelineError, Result};

/// A dense row-major matrix of `f32` values, one row per dataset line.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    width:  usize,
    values: Vec<f32>,
}

impl Table {
    /// `values.len()` must be a multiple of `width`.
    pub fn new(width: usize, values: Vec<f32>) -> Result<Self> {
        if width == 0 || values.len() % width != 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "{} values cannot be split into rows of width {}",
                values.len(),
                width
            )));
        }
        Ok(Self { width, values })
    }

    pub fn width(&self) -> usize { self.width }

    pub fn rows(&self) -> usize { self.values.len() / self.width }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.values[index * self.width..(index + 1) * self.width]
    }

    pub fn values(&self) -> &[f32] { &self.values }
}

/// Features and labels read from two parallel files.
/// Row `i` of `labels` is the target for row `i` of `features`.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Table,
    labels:   Table,
}

impl Dataset {
    pub fn new(features: Table, labels: Table) -> Result<Self> {
        if features.rows() != labels.rows() {
            return Err(PipelineError::shape("label row count", features.rows(), labels.rows()));
        }
        Ok(Self { features, labels })
    }

    /// Read both files, going through the binary cache when enabled.
    pub fn load(features: &Path, labels: &Path, use_cache: bool) -> Result<Self> {
        let features = load_table(features, use_cache)?;
        let labels   = load_table(labels, use_cache)?;
        Self::new(features, labels)
    }

    pub fn len(&self) -> usize { self.features.rows() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn feature_count(&self) -> usize { self.features.width() }

    pub fn class_count(&self) -> usize { self.labels.width() }

    pub fn features(&self) -> &Table { &self.features }

    pub fn labels(&self) -> &Table { &self.labels }

    /// Fail unless rows are exactly as wide as the network expects.
    pub fn check_widths(&self, feature_count: usize, class_count: usize) -> Result<()> {
        if self.feature_count() != feature_count {
            return Err(PipelineError::shape("feature width", feature_count, self.feature_count()));
        }
        if self.class_count() != class_count {
            return Err(PipelineError::shape("label width", class_count, self.class_count()));
        }
        Ok(())
    }
}

/// A contiguous half-open range `[start, end)` of dataset rows.
/// Construction guarantees at least one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: usize,
    end:   usize,
}

impl Window {
    pub fn new(which: &'static str, start: usize, end: usize) -> Result<Self> {
        if end <= start {
            return Err(PipelineError::EmptyWindow { which, start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize { self.start }

    pub fn end(&self) -> usize { self.end }

    pub fn len(&self) -> usize { self.end - self.start }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}
