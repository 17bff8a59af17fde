//! # Conference Central Core
//!
//! Storage-neutral building blocks for the Conference Central registration
//! service.
//!
//! This crate provides the fundamental abstractions the domain layer is
//! built on:
//!
//! - **`RecordStore`**: a keyed, versioned record store with atomic
//!   multi-record commits under optimistic concurrency control
//! - **`RecordKey` / `Version`**: strong types for record identity and
//!   version numbers
//! - **`Clock`**: injected time source for testability
//! - **`RetryPolicy`**: bounded retry with exponential backoff, used to
//!   re-run transaction bodies when a concurrent writer wins the race
//!
//! ## Architecture Principles
//!
//! - Explicit dependencies (no global singletons — stores and clocks are
//!   constructed once and passed by reference)
//! - Typed errors over stringly-typed status flags
//! - Optimistic concurrency: readers never block, writers detect conflicts
//!   at commit time and re-run against fresh state
//!
//! ## Example
//!
//! ```ignore
//! use conference_central_core::{RecordKey, RecordStore, Version, Write};
//!
//! async fn bump<E: RecordStore>(store: &E) -> Result<(), Box<dyn std::error::Error>> {
//!     let key = RecordKey::new("conference", "abc");
//!     let current = store.get(key.clone()).await?;
//!     let expected = current.as_ref().map_or(Version::INITIAL, |r| r.version);
//!     store
//!         .commit(vec![Write::expecting(key, expected, b"{}".to_vec())])
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod environment;
pub mod record;
pub mod retry;
pub mod store;

pub use environment::{AnnouncementCache, Clock, FixedClock, SystemClock};
pub use record::{ParseRecordKeyError, RecordKey, Version, VersionedRecord, Write};
pub use retry::{RetryPolicy, retry_with_predicate};
pub use store::{RecordStore, StoreError, StoreFuture};
