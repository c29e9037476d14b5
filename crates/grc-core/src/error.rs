//! # Error Types
//!
//! The error taxonomy shared by every engine in the workspace.
//!
//! - **NotFound**: a referenced framework, finding, or tracker is absent.
//!   Surfaced to the caller, never retried.
//! - **Validation**: malformed filter, date, or enum input, rejected before
//!   any computation runs.
//! - **InvalidTransition**: a lifecycle transition the current state forbids.
//! - **Storage**: a collaborator read or write failed.
//!
//! Missing related entities during report computation (a mapping whose
//! control cannot be loaded) are not errors. Report engines resolve them
//! locally and never construct a `GrcError` for them.

use thiserror::Error;

/// Top-level error type for the posture engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrcError {
    /// A referenced record does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record kind, e.g. "finding" or "tracker".
        kind: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// Input rejected before computation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Lifecycle transition rejected.
    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    /// Collaborator read or write failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl GrcError {
    /// Build a `NotFound` error for the given record kind.
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether this error is a `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
