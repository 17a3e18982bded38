//! Error types for the repositories.

use thiserror::Error;

/// Errors that can occur while reading from a repository.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RepositoryError {
    /// The backing store is switched off.
    #[error("{0} repository is unavailable")]
    Unavailable(&'static str),

    /// The caller cancelled the request.
    #[error("{0} request cancelled")]
    Cancelled(&'static str),
}
