//! Error types for metadata operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for metadata operations.
pub type MetaResult<T> = Result<T, MetaError>;

/// Errors that can occur during metadata operations.
#[derive(Debug, Error)]
pub enum MetaError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A log record could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A log line could not be decoded.
    #[error("metadata log corrupted at line {line}: {message}")]
    Corrupted {
        /// 1-based line number in the log.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Another process holds the log open.
    #[error("metadata log locked: {0}")]
    Locked(PathBuf),

    /// Keys must be non-empty.
    #[error("empty metadata key")]
    EmptyKey,
}
