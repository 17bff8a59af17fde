//! Record identity and versioning types.
//!
//! This module defines strong types for record identification (`RecordKey`)
//! and optimistic concurrency control (`Version`), plus the record/write
//! shapes exchanged with a [`RecordStore`](crate::store::RecordStore).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for `RecordKey` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid record key: {0}")]
pub struct ParseRecordKeyError(String);

/// Namespaced identity of a stored record.
///
/// A record key pairs a `kind` (the namespace, e.g. `"conference"`) with an
/// `id` unique within that namespace. For example:
///
/// - `conference/2c0f…`
/// - `profile/alice@example.com`
/// - `session/7b11…`
///
/// # Design
///
/// `RecordKey` is a plain owned pair of strings. It provides:
/// - Type safety (can't accidentally pass a bare string where a key belongs)
/// - A stable `Display` form (`kind/id`) used in logs and error messages
/// - Serialization support for storage backends
///
/// # Validation
///
/// - `FromStr::from_str()`: parses the `kind/id` display form, rejecting
///   empty components
/// - `new()`: no validation (for application-controlled input)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    kind: String,
    id: String,
}

impl RecordKey {
    /// Create a new `RecordKey` from a kind and an id.
    ///
    /// # Examples
    ///
    /// ```
    /// use conference_central_core::RecordKey;
    ///
    /// let key = RecordKey::new("conference", "abc-123");
    /// assert_eq!(key.kind(), "conference");
    /// assert_eq!(key.id(), "abc-123");
    /// ```
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// The namespace this record belongs to.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The identifier, unique within the namespace.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

impl FromStr for RecordKey {
    type Err = ParseRecordKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((kind, id)) if !kind.is_empty() && !id.is_empty() => Ok(Self::new(kind, id)),
            _ => Err(ParseRecordKeyError(format!(
                "expected non-empty `kind/id`, got {s:?}"
            ))),
        }
    }
}

/// Record version number for optimistic concurrency control.
///
/// Versions start at 0 — [`Version::INITIAL`] — which denotes "record does
/// not exist yet". Every committed write bumps the record's version by 1.
/// The version is used to detect concurrent modifications:
///
/// - When committing writes, you state the version you read
/// - If the record has moved on since, the commit fails
/// - This prevents lost updates in concurrent scenarios
///
/// # Examples
///
/// ```
/// use conference_central_core::Version;
///
/// let v0 = Version::INITIAL;
/// let v1 = v0.next();
/// assert_eq!(v1, Version::new(1));
/// assert_eq!(v1.value(), 1);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// The version of a record that has never been written (0).
    pub const INITIAL: Self = Self(0);

    /// Create a new `Version` with the given value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the version number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Get the next version (current + 1).
    ///
    /// # Overflow Behavior
    ///
    /// Reaching `u64::MAX` writes to a single record is not a realistic
    /// concern; the addition is unchecked.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Check if this is the initial version (record absent).
    #[must_use]
    pub const fn is_initial(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Version> for u64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A stored record together with its current version.
///
/// Payloads are opaque serialized bytes; the domain layer owns the encoding
/// (serde_json in the registration crate).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedRecord {
    /// Identity of the record.
    pub key: RecordKey,
    /// Version the record was read at.
    pub version: Version,
    /// Serialized record body.
    pub payload: Vec<u8>,
}

/// One element of an atomic commit.
///
/// The `expected` field carries the optimistic concurrency assertion:
///
/// - `Some(Version::INITIAL)`: the record must not exist yet (insert)
/// - `Some(v)`: the record must currently be at version `v`
/// - `None`: write unconditionally (upsert, no conflict detection — use
///   with caution)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Write {
    /// Identity of the record to write.
    pub key: RecordKey,
    /// Version assertion checked at commit time.
    pub expected: Option<Version>,
    /// Serialized record body to store.
    pub payload: Vec<u8>,
}

impl Write {
    /// Create a write asserting the record is currently at `expected`.
    #[must_use]
    pub const fn expecting(key: RecordKey, expected: Version, payload: Vec<u8>) -> Self {
        Self {
            key,
            expected: Some(expected),
            payload,
        }
    }

    /// Create an unconditional write (no version check).
    #[must_use]
    pub const fn unconditional(key: RecordKey, payload: Vec<u8>) -> Self {
        Self {
            key,
            expected: None,
            payload,
        }
    }
}
