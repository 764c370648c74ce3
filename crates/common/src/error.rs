//! Error type returned by remote key-custody collaborators.

use thiserror::Error;

/// Failure reported by a remote key-custody collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The service refused the request: block too large, wrong algorithm,
    /// missing permission.
    #[error("request rejected by key service: {0}")]
    Rejected(String),

    /// The key or key version does not exist.
    #[error("key not found: {0}")]
    NotFound(String),

    /// The request did not complete: connection failure, throttling, or a
    /// server-side error.
    #[error("key service transport failure: {0}")]
    Transport(String),
}
