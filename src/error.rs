//! Error types for the bbox-match library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for bbox-match operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Error types that can occur while loading boxes or classifying them.
///
/// There are no retryable variants: every error is fatal for the call that
/// produced it.
#[derive(Error, Debug)]
pub enum EvalError {
    /// A source collection could not be found.
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// A record is missing a required field or carries an invalid value.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A box with non-positive width or height reached the IoU computation.
    #[error("Degenerate box {annotation_id}: width={width}, height={height}")]
    DegenerateBox {
        annotation_id: u64,
        width: i64,
        height: i64,
    },

    /// IoU threshold outside (0, 1].
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// A configuration document carries an unknown or mistyped value.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Worker count of zero.
    #[error("Invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),

    /// Syntax-level JSON error.
    #[error("JSON error: {0}")]
    JsonError(#[source] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The worker pool could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            // Missing fields and wrong types are schema violations, not parse failures
            serde_json::error::Category::Data => EvalError::MalformedRecord(err.to_string()),
            _ => EvalError::JsonError(err),
        }
    }
}
