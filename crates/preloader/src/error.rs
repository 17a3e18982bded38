//! # Preload Errors
//!
//! This module defines the single error type returned by every loader, the orchestrator and the
//! registry. Cardinality variants carry the offending parent id and the observed match count so
//! callers can report *which* row broke a to-one relation, not just that one did.

/// Boxed error returned by resolvers and fetchers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while loading or preloading a relation.
#[derive(Debug, thiserror::Error)]
pub enum PreloadError {
    /// A resolver or fetcher failed. The collaborator's error is kept as `source()`.
    #[error("{relation}: collaborator failed: {source}")]
    Collaborator {
        relation: String,
        #[source]
        source: BoxError,
    },

    /// A to-one relation resolved more than one target for a parent.
    #[error("{relation}: parent {parent} resolved {found} targets, expected at most one")]
    TooManyHasOne {
        relation: String,
        parent: String,
        found: usize,
    },

    /// A to-one relation resolved no target and the loader does not accept that.
    #[error("{relation}: parent {parent} resolved no target")]
    NotFoundHasOne { relation: String, parent: String },

    /// The cancellation token fired before the next collaborator call.
    #[error("{relation}: cancelled")]
    Cancelled { relation: String },

    /// A registry entry exists under `key` but is not the requested loader type.
    #[error("registry key {key} is not a {expected}")]
    RegistryMismatch { key: String, expected: &'static str },

    /// Nothing was registered under `key`.
    #[error("registry key {key} is not registered")]
    NotRegistered { key: String },
}

impl PreloadError {
    pub(crate) fn collaborator(relation: &str, source: BoxError) -> Self {
        PreloadError::Collaborator {
            relation: relation.to_string(),
            source,
        }
    }

    pub(crate) fn cancelled(relation: &str) -> Self {
        PreloadError::Cancelled {
            relation: relation.to_string(),
        }
    }

    /// Returns `true` for the two to-one cardinality violations.
    pub fn is_cardinality(&self) -> bool {
        matches!(
            self,
            PreloadError::TooManyHasOne { .. } | PreloadError::NotFoundHasOne { .. }
        )
    }
}
