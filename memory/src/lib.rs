//! # Conference Central Memory
//!
//! In-memory adapters for Conference Central: the single-process
//! [`InMemoryStore`] record store and the [`InMemoryCache`] announcement
//! cache.
//!
//! These back the test suites and any single-node deployment. The store
//! honors the full consistency contract of
//! [`RecordStore`](conference_central_core::RecordStore): a commit takes
//! the write lock once, validates every version assertion, and applies
//! either the whole batch or nothing, so paired profile/conference writes
//! are indivisible to any concurrent reader.

pub mod cache;
pub mod store;

pub use cache::InMemoryCache;
pub use store::InMemoryStore;
