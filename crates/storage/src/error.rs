//! Storage error types
//!
//! Backends map their failures onto [`StorageError`]. The "not found"
//! condition has its own variant so callers can treat a missing key or an
//! empty prefix as "nothing allocated yet" instead of a failure.

use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key (or every key below a prefix) does not exist
    #[error("Key '{key}' not found")]
    NotFound {
        /// Key or prefix that was looked up
        key: String,
    },

    /// The caller cancelled the operation before it ran
    #[error("Operation on key '{key}' was cancelled")]
    Cancelled {
        /// Key the cancelled call addressed
        key: String,
    },

    /// Key is not acceptable to the backend
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// Any other backend failure
    #[error("Backend failure on key '{key}': {message}")]
    Backend {
        /// Key the failing call addressed
        key: String,
        /// Backend-specific description
        message: String,
        /// Underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StorageError {
    /// Create a not-found error
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a cancellation error
    pub fn cancelled(key: impl Into<String>) -> Self {
        Self::Cancelled { key: key.into() }
    }

    /// Create a backend error without an underlying source
    pub fn backend(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            key: key.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Check if this error reports a missing key
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error reports a cancelled call
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Key the failing call addressed
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::NotFound { key }
            | Self::Cancelled { key }
            | Self::InvalidKey { key, .. }
            | Self::Backend { key, .. } => key,
        }
    }
}
