//! Error types for range pool operations
//!
//! Every failure carries an [`ErrorKind`] so callers can branch on the kind
//! instead of comparing against error instances:
//!
//! - `CapacityReached` and `ItemsNotFound` are expected outcomes of normal
//!   operation (see [`Error::is_expected`])
//! - `InvalidConfig` and `ExecutionFailed` are usage errors, detected before
//!   any storage write
//! - storage failures are wrapped with the operation that issued them and keep
//!   their not-found / cancelled distinction

use std::num::ParseIntError;

use rangepool_storage::StorageError;
use thiserror::Error;

/// Result type for range pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Construction-time failure (missing collaborator, bad key prefix)
    InvalidConfig,
    /// Invalid arguments to an operation
    ExecutionFailed,
    /// No free integer left in the requested range
    CapacityReached,
    /// The owner holds no items in the namespace
    ItemsNotFound,
    /// The storage backend reported a failure
    Storage,
    /// A stored value is not a valid item
    Corrupted,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidConfig => "invalid config",
            Self::ExecutionFailed => "execution failed",
            Self::CapacityReached => "capacity reached",
            Self::ItemsNotFound => "items not found",
            Self::Storage => "storage",
            Self::Corrupted => "corrupted",
        };
        f.write_str(name)
    }
}

/// Range pool error
#[derive(Debug, Error)]
pub enum Error {
    /// Service configuration is invalid
    #[error("Configuration error: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration
        message: String,
    },

    /// Operation arguments are invalid
    #[error("Execution failed: {message}")]
    ExecutionFailed {
        /// Which argument was rejected and why
        message: String,
    },

    /// Every integer of the range is allocated
    #[error("Capacity reached: no free item in range [{min}, {max}]")]
    CapacityReached {
        /// Lower bound of the exhausted range
        min: u64,
        /// Upper bound of the exhausted range
        max: u64,
    },

    /// Owner holds no items
    #[error("No items found for owner '{owner}' in namespace '{namespace}'")]
    ItemsNotFound {
        /// Namespace that was searched
        namespace: String,
        /// Owner that was searched
        owner: String,
    },

    /// Storage backend failure
    #[error("Storage error while trying to {operation}: {source}")]
    Storage {
        /// The range pool step that issued the call
        operation: &'static str,
        /// Underlying storage error
        #[source]
        source: StorageError,
    },

    /// A stored value does not parse as an item
    #[error("Corrupt value '{value}' stored under '{key}'")]
    CorruptValue {
        /// Key or prefix the value was read from
        key: String,
        /// The raw value
        value: String,
        /// Parse failure
        #[source]
        source: ParseIntError,
    },
}

impl Error {
    /// Create a configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an argument validation error
    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            message: message.into(),
        }
    }

    pub(crate) fn storage(operation: &'static str, source: StorageError) -> Self {
        Self::Storage { operation, source }
    }

    /// The kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
            Self::CapacityReached { .. } => ErrorKind::CapacityReached,
            Self::ItemsNotFound { .. } => ErrorKind::ItemsNotFound,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::CorruptValue { .. } => ErrorKind::Corrupted,
        }
    }

    /// Check if the range had no free item left
    #[must_use]
    pub fn is_capacity_reached(&self) -> bool {
        self.kind() == ErrorKind::CapacityReached
    }

    /// Check if the owner held no items
    #[must_use]
    pub fn is_items_not_found(&self) -> bool {
        self.kind() == ErrorKind::ItemsNotFound
    }

    /// Check if the arguments were rejected
    #[must_use]
    pub fn is_execution_failed(&self) -> bool {
        self.kind() == ErrorKind::ExecutionFailed
    }

    /// Check if the configuration was rejected
    #[must_use]
    pub fn is_invalid_config(&self) -> bool {
        self.kind() == ErrorKind::InvalidConfig
    }

    /// Check if the storage backend reported a missing key
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.storage_error().is_some_and(StorageError::is_not_found)
    }

    /// Check if the operation was aborted by cancellation
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.storage_error().is_some_and(StorageError::is_cancelled)
    }

    /// Whether this is an expected outcome rather than a failure
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CapacityReached | ErrorKind::ItemsNotFound
        )
    }

    /// The wrapped storage error, if any
    #[must_use]
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::Storage { source, .. } => Some(source),
            _ => None,
        }
    }
}
