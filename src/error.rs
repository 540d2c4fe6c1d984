use std::path::PathBuf;

use ndarray_npy::{ReadNpyError, WriteNpyError};
use thiserror::Error;

/// Errors reported by the plotting and embedding tools.
#[derive(Debug, Error)]
pub enum VizError {
    /// An input file is missing or unreadable.
    #[error("failed to read {path}: {source}")]
    DataLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The training log is not valid JSON or lacks one of the required keys.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read array {path}: {source}")]
    NpyRead {
        path: PathBuf,
        #[source]
        source: ReadNpyError,
    },

    #[error("failed to write array {path}: {source}")]
    NpyWrite {
        path: PathBuf,
        #[source]
        source: WriteNpyError,
    },

    #[error("unsupported element type in {path}")]
    UnsupportedDtype { path: PathBuf },

    /// Parallel arrays or sequences disagree in length.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("training log has no usable epochs")]
    EmptyLog,

    #[error("failed to draw chart: {0}")]
    Plot(String),

    #[error("checkpoint {path} could not be used: {reason}")]
    Checkpoint { path: PathBuf, reason: String },

    #[error("tensor data could not be read back: {0}")]
    Tensor(String),

    /// Embeddings must come from an inference backend, not an autodiff one.
    #[error("embedding generation needs an inference backend; use the inner backend of Autodiff")]
    AutodiffBackend,

    /// `--embed` was requested but no pocket encoder is linked into this binary.
    #[error("embedding generation needs a linked pocket encoder; rerun without --embed")]
    GeneratorUnavailable,
}

impl VizError {
    pub(crate) fn shape(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            found,
        }
    }
}
