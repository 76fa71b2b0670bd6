//! Error types for Codepage core.

use codepage_meta::EntityId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Codepage core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Metadata store error.
    #[error("metadata error: {0}")]
    Meta(#[from] codepage_meta::MetaError),

    /// No entry exists with this identifier.
    #[error("entry not found: {0}")]
    EntityNotFound(EntityId),

    /// The entry exists but is not a managed code page.
    #[error("entry {id} is of kind {kind:?}, not a code page")]
    WrongKind {
        /// The entry identifier.
        id: EntityId,
        /// The entry's actual content kind.
        kind: String,
    },

    /// A stored entry record could not be decoded.
    #[error("invalid record for entry {id}: {message}")]
    InvalidRecord {
        /// The entry identifier.
        id: EntityId,
        /// Description of the problem.
        message: String,
    },

    /// Caller-supplied input is invalid.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
