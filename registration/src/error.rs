//! Typed failures of the registration service.
//!
//! Every operation reports a discriminated error kind plus a human-readable
//! reason; nothing is ever signalled through boolean/reason-string pairs,
//! and no operation returns an ambiguous "maybe succeeded" result.

use conference_central_core::StoreError;
use std::fmt;
use thiserror::Error;

/// Errors surfaced by [`RegistrationService`](crate::RegistrationService)
/// operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A referenced entity does not exist.
    #[error("No {entity} found with key: {id}")]
    NotFound {
        /// Kind of the missing entity (`"conference"`, `"session"`, ...).
        entity: &'static str,
        /// Identifier that failed to resolve.
        id: String,
    },

    /// An invariant would be violated: duplicate registration, seat
    /// exhaustion, duplicate or missing wishlist entry, or a competing
    /// write that survived all retries.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller does not own the resource being modified.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A form field failed validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No identity was presented. Detected by the external caller; carried
    /// here so outer layers can surface it through the same error type.
    #[error("Authorization required")]
    Unauthenticated,

    /// Non-conflict storage fault (serialization, backend failure).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RegistrationError {
    /// Build a `NotFound` for the given entity kind and id.
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this is a `Conflict`.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<StoreError> for RegistrationError {
    /// Store faults that reach the caller are either contention that
    /// exhausted its retries (a `Conflict`) or an infrastructure fault.
    fn from(err: StoreError) -> Self {
        if err.is_conflict() {
            Self::Conflict(format!("concurrent modification: {err}"))
        } else {
            Self::Storage(err.to_string())
        }
    }
}
