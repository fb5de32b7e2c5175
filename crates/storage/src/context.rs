//! Per-call storage context with cancellation support

use tokio_util::sync::CancellationToken;

/// Context for storage operations.
///
/// Carries a cooperative cancellation token and an optional request
/// identifier. Callers hand the same context to every storage call of an
/// operation; backends check the token before doing any work.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Cooperative cancellation token. Once cancelled, storage calls fail with
    /// [`StorageError::Cancelled`](crate::StorageError::Cancelled).
    pub cancellation: CancellationToken,
    /// Optional identifier used to correlate log lines of one request.
    pub request_id: Option<String>,
}

impl Context {
    /// Create a new context with a fresh cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default cancellation token with the provided one.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Attach a request identifier.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Whether the caller has requested cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
