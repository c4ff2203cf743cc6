// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per held-out evaluation so learning
// curves can be plotted after (or during) a run.
//
// Output file: <checkpoint dir>/metrics.csv
//
//   step,learning_rate,train_loss,accuracy,best_accuracy,elapsed_secs
//   1000,0.000100,4.812344,0.081000,0.081000,12.403
//   2000,0.000100,4.530117,0.094500,0.094500,24.911
//
// train_loss is the mean batch loss since the previous row.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const HEADER: &str = "step,learning_rate,train_loss,accuracy,best_accuracy,elapsed_secs";

/// One row of the evaluation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalMetrics {
    pub step:          usize,
    pub learning_rate: f64,
    pub train_loss:    f64,
    pub accuracy:      f64,
    pub best_accuracy: f64,
    pub elapsed_secs:  f64,
}

impl EvalMetrics {
    /// True if this evaluation set a new best.
    pub fn is_improvement(&self, previous_best: Option<f64>) -> bool {
        previous_best.map_or(true, |best| self.accuracy > best)
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet, so
    /// repeated runs into the same directory keep appending.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EvalMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.3}",
            m.step,
            m.learning_rate,
            m.train_loss,
            m.accuracy,
            m.best_accuracy,
            m.elapsed_secs,
        )?;

        tracing::debug!("Logged step {} metrics: accuracy={:.4}", m.step, m.accuracy);
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn row(step: usize, accuracy: f64) -> EvalMetrics {
        EvalMetrics {
            step,
            learning_rate: 1e-4,
            train_loss:    1.5,
            accuracy,
            best_accuracy: accuracy,
            elapsed_secs:  2.0,
        }
    }

    #[test]
    fn test_is_improvement() {
        let m = row(10, 0.4);
        assert!(m.is_improvement(None));
        assert!(m.is_improvement(Some(0.3)));
        assert!(!m.is_improvement(Some(0.4)));
    }

    #[test]
    fn test_unwritable_dir_is_io_error() {
        let dir  = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(MetricsLogger::new(&file), Err(crate::error::PipelineError::Io(_))));
    }

    #[test]
    fn test_rows_are_appended_after_header() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&row(5, 0.5)).unwrap();

        // A second logger on the same directory must not rewrite the header.
        let again = MetricsLogger::new(dir.path()).unwrap();
        again.log(&row(10, 0.75)).unwrap();

        let text  = std::fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[2].starts_with("10,0.000100,1.500000,0.750000"));
    }
}
