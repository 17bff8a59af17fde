//! Injected dependency traits.
//!
//! All external dependencies of the domain layer are abstracted behind
//! traits and passed explicitly at construction time — no global
//! singletons, no `getInstance()` accessors.

use crate::store::StoreFuture;
use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// # Examples
///
/// ```
/// use conference_central_core::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for deterministic tests.
///
/// Always returns the same time, making tests reproducible.
///
/// # Example
///
/// ```
/// use conference_central_core::{Clock, FixedClock};
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time.
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }

    /// Create a default fixed clock for tests (2026-01-01 00:00:00 UTC).
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which should never
    /// happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn for_tests() -> Self {
        Self::new(
            DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Plain-text key/value cache for announcements.
///
/// The memcache equivalent of the original deployment: an external periodic
/// job scans the stores and writes a human-readable announcement string
/// under a well-known key, and read-only endpoints serve it back. The
/// registration invariant itself never touches this cache.
///
/// # Dyn Compatibility
///
/// Boxed futures keep the trait object-safe so jobs can hold an
/// `Arc<dyn AnnouncementCache>`.
pub trait AnnouncementCache: Send + Sync {
    /// Store `text` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`](crate::StoreError::Backend) if the
    /// cache backend fails.
    fn put(&self, key: String, text: String) -> StoreFuture<'_, ()>;

    /// Fetch the text stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`](crate::StoreError::Backend) if the
    /// cache backend fails.
    fn get(&self, key: String) -> StoreFuture<'_, Option<String>>;
}
