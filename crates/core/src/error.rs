//! Storage failure signals.

use thiserror::Error;

/// Result type returned by storage capabilities.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a persistence collaborator.
///
/// These are the only signals the auth layer classifies on. Anything a
/// backend cannot express as one of the named conditions is `Backend`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A user with the same email is already stored.
    #[error("user already exists")]
    UserExists,

    /// No user matches the lookup key.
    #[error("user not found")]
    UserNotFound,

    /// No application matches the lookup key.
    #[error("app not found")]
    AppNotFound,

    /// Any other backend failure (connection, query, decoding).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// True for the not-found family of signals.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound | Self::AppNotFound)
    }
}
