//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant maps to a distinct outcome at the boundary layer, so none of
/// them may be collapsed into another when propagating.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The acting user is not known to the directory.
    #[error("user does not exist: {0}")]
    UserNotExists(String),

    /// The acting user exists but may not perform the action.
    #[error("not enough rights: {0}")]
    NoRights(String),

    /// An entity or a version of it does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed input or a request the current state does not allow.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An expected-version precondition did not hold.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence or invariant failure. Previously committed state is intact.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn user_not_exists(username: impl Into<String>) -> Self {
        Self::UserNotExists(username.into())
    }

    pub fn no_rights(msg: impl Into<String>) -> Self {
        Self::NoRights(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable kind, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::UserNotExists(_) => "user_not_exists",
            DomainError::NoRights(_) => "no_rights",
            DomainError::NotFound(_) => "not_found",
            DomainError::Validation(_) => "validation",
            DomainError::Conflict(_) => "conflict",
            DomainError::Internal(_) => "internal",
        }
    }
}
