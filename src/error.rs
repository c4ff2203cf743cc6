// ============================================================
// Shared error type for the data, ml and infra layers
// ============================================================
// The application and CLI layers wrap these in anyhow with
// extra context; everything below them returns `Result<T>`.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading data, training,
/// persisting or evaluating a network.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A dataset row could not be parsed, or its field count
    /// differs from the rows before it.
    #[error("{}:{line}: {reason}", path.display())]
    Format {
        path:   PathBuf,
        line:   usize,
        reason: String,
    },

    /// Row widths (or row counts) disagree with what the network
    /// or the parallel file expects.
    #[error("shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what:     String,
        expected: usize,
        got:      usize,
    },

    /// A training or evaluation window has no eligible rows.
    #[error("{which} window [{start}, {end}) is empty")]
    EmptyWindow {
        which: &'static str,
        start: usize,
        end:   usize,
    },

    /// A checkpoint, sidecar or metadata file could not be written or read.
    #[error("checkpoint I/O failed for '{}': {reason}", path.display())]
    Persistence {
        path:   PathBuf,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tensor data could not be converted back into host values.
    #[error("tensor data: {0}")]
    Tensor(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persistence {
            path:   path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn shape(what: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            got,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_mentions_line() {
        let err = PipelineError::Format {
            path:   PathBuf::from("data/preflop"),
            line:   7,
            reason: "field 3 is not a number".into(),
        };
        assert_eq!(err.to_string(), "data/preflop:7: field 3 is not a number");
    }

    #[test]
    fn test_empty_window_message() {
        let err = PipelineError::EmptyWindow { which: "held-out", start: 4, end: 4 };
        assert!(err.to_string().contains("held-out window [4, 4)"));
    }
}
