//! Record store trait for versioned keyed records.
//!
//! This module defines the core persistence abstraction of Conference
//! Central: a keyed record store with optimistic concurrency control and
//! atomic multi-record commits.
//!
//! # Design
//!
//! The `RecordStore` trait is deliberately minimal. It provides exactly
//! what the registration invariant needs:
//!
//! - Read a record with its current version
//! - Commit a batch of writes atomically, each carrying a version assertion
//! - Scan a namespace for the read-only query/announcement layer
//!
//! The atomic commit is the one true concurrency requirement in the system:
//! operations that pair a profile mutation with a conference or session
//! mutation must be indivisible from the perspective of any concurrent
//! reader. A commit either applies every write or none of them.
//!
//! # Implementations
//!
//! - `InMemoryStore` (in `conference-central-memory`): single-process
//!   implementation backed by a `HashMap` under one lock
//!
//! # Dyn Compatibility
//!
//! This trait uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` to enable trait object usage (`Arc<dyn RecordStore>`), which
//! is how the registration service holds its backend.

use crate::record::{RecordKey, Version, VersionedRecord, Write};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during record store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency conflict: a write's expected version doesn't
    /// match the record's current version.
    ///
    /// This typically means another transaction committed between the read
    /// and the commit. The caller should re-read current state and re-run
    /// the transaction body rather than retry with stale values.
    #[error("Version conflict on {key}: expected version {expected}, found {actual}")]
    VersionConflict {
        /// The record where the conflict occurred.
        key: RecordKey,
        /// The version the write asserted.
        expected: Version,
        /// The actual current version of the record.
        actual: Version,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend failure (connection, I/O, poisoned lock).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether this error indicates a lost optimistic-concurrency race.
    ///
    /// Conflicts are transient: re-running the transaction body against
    /// fresh state may succeed. Other store errors are not retryable.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Boxed future returned by [`RecordStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Versioned keyed record store with atomic multi-record commits.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to be shared across tasks as
/// `Arc<dyn RecordStore>`.
///
/// # Consistency Contract
///
/// `commit` must be all-or-nothing and serializable against concurrent
/// commits touching the same records: every expected version is validated
/// against current state, and either all writes apply (each bumping its
/// record's version by 1) or none do.
pub trait RecordStore: Send + Sync {
    /// Read a record by key.
    ///
    /// Returns `None` if the record has never been written. An absent
    /// record is at [`Version::INITIAL`] for the purposes of a subsequent
    /// insert assertion.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Backend`] if the backend fails
    fn get(&self, key: RecordKey) -> StoreFuture<'_, Option<VersionedRecord>>;

    /// Atomically apply a batch of writes.
    ///
    /// Each [`Write`] may assert the version the caller read; the whole
    /// batch fails with [`StoreError::VersionConflict`] if any assertion
    /// does not hold, leaving every record at its pre-call value.
    ///
    /// # Errors
    ///
    /// - [`StoreError::VersionConflict`] if any version assertion fails
    /// - [`StoreError::Backend`] if the backend fails
    fn commit(&self, writes: Vec<Write>) -> StoreFuture<'_, ()>;

    /// Load all records of a given kind.
    ///
    /// Used by the read-only query and announcement layers. Returns records
    /// in unspecified order; an unknown kind yields an empty vector.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Backend`] if the backend fails
    fn scan(&self, kind: String) -> StoreFuture<'_, Vec<VersionedRecord>>;
}
