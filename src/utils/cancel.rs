//! Cancellation utilities
//!
//! Provides the abort handle bound to one in-flight generation.

use tokio_util::sync::CancellationToken;

/// A handle that can be used to abort a generation.
///
/// Clones share the same underlying token. Firing it makes the pending
/// network call or the next pending body read return `ChatError::Aborted`;
/// chunks already applied to the transcript are kept.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    token: CancellationToken,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Dropping the aborted body stream closes the
    /// underlying HTTP connection so the backend stops generating tokens.
    pub fn abort(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once `abort` has been called on any clone.
    pub async fn aborted(&self) {
        self.token.cancelled().await
    }

    /// Underlying token, for callers that already select on tokio-util tokens.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for AbortHandle {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}

/// Create a standalone abort handle for a new generation.
pub fn new_abort_handle() -> AbortHandle {
    AbortHandle::new()
}
