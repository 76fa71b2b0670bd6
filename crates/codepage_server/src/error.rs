//! Error types for the HTTP surface.

use codepage_core::CoreError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while serving a request.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No valid login session.
    #[error("authentication required: {0}")]
    Unauthenticated(String),

    /// The session may not perform this action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// No such route or entry.
    #[error("not found: {0}")]
    NotFound(String),

    /// The route exists but not for this method.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Request body over the configured limit.
    #[error("payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge {
        /// Declared or observed body size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Core pipeline error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::InvalidRequest(_) => 400,
            ServerError::Unauthenticated(_) => 401,
            ServerError::Forbidden(_) => 403,
            ServerError::NotFound(_) => 404,
            ServerError::MethodNotAllowed(_) => 405,
            ServerError::PayloadTooLarge { .. } => 413,
            ServerError::Core(CoreError::EntityNotFound(_) | CoreError::WrongKind { .. }) => 404,
            ServerError::Core(CoreError::InvalidInput(_)) => 400,
            ServerError::Core(_) | ServerError::Io(_) => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepage_core::EntityId;

    #[test]
    fn error_classification() {
        assert!(ServerError::InvalidRequest("bad".into()).is_client_error());
        assert!(ServerError::Io(std::io::Error::other("disk")).is_server_error());
        assert!(!ServerError::InvalidRequest("bad".into()).is_server_error());
    }

    #[test]
    fn status_codes() {
        assert_eq!(ServerError::Unauthenticated("x".into()).status_code(), 401);
        assert_eq!(ServerError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(
            ServerError::PayloadTooLarge { size: 10, limit: 5 }.status_code(),
            413
        );
        assert_eq!(
            ServerError::Core(CoreError::EntityNotFound(EntityId::new(4))).status_code(),
            404
        );
    }

    #[test]
    fn error_display() {
        let err = ServerError::PayloadTooLarge {
            size: 5_000_000,
            limit: 4_194_304,
        };
        let msg = err.to_string();
        assert!(msg.contains("5000000"));
        assert!(msg.contains("4194304"));
    }
}
