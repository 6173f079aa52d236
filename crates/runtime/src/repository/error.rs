//! Error types raised by slot repositories.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("slot repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
