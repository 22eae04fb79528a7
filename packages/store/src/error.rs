//! Error kinds shared by every storage backend and the operations built on them.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("An account with this email already exists")]
    DuplicateEmail,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Comment must not be empty")]
    EmptyContent,
    #[error("Unknown trail: {0}")]
    UnknownTrail(String),
    /// Backend failure, message carried verbatim from the storage layer.
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl Error {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageFailure(err.to_string())
    }
}
