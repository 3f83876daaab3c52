//! Error taxonomy shared by the store, the gateway and the HTTP surface.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::document::DocumentError;

/// Result type for store and gateway operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store and gateway operations.
///
/// Every variant maps to a stable [`kind`](StoreError::kind) tag so clients
/// can branch on the classification rather than on message text.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dataset '{name}' not found")]
    NotFound { name: String },

    #[error("dataset '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("operation failed on '{name}': {source}")]
    OperationFailed {
        name: String,
        #[source]
        source: DocumentError,
    },

    #[error("persistence failure at {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn not_found(name: &str) -> Self {
        StoreError::NotFound {
            name: name.to_string(),
        }
    }

    pub fn already_exists(name: &str) -> Self {
        StoreError::AlreadyExists {
            name: name.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        StoreError::InvalidRequest(message.into())
    }

    pub fn operation(name: &str, source: DocumentError) -> Self {
        StoreError::OperationFailed {
            name: name.to_string(),
            source,
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Stable snake_case classification tag.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "not_found",
            StoreError::AlreadyExists { .. } => "already_exists",
            StoreError::InvalidRequest(_) => "invalid_request",
            StoreError::OperationFailed { .. } => "operation_failed",
            StoreError::Persistence { .. } => "persistence_error",
        }
    }
}
