//! In-memory [`AnnouncementCache`] implementation.

use conference_central_core::{AnnouncementCache, StoreError, StoreFuture};
use std::collections::HashMap;
use std::sync::RwLock;

/// Plain key/value text cache backed by a `HashMap`.
///
/// Stands in for memcache in tests and single-node deployments.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnouncementCache for InMemoryCache {
    fn put(&self, key: String, text: String) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut entries = self
                .entries
                .write()
                .map_err(|_| StoreError::Backend("cache lock poisoned".to_string()))?;
            entries.insert(key, text);
            Ok(())
        })
    }

    fn get(&self, key: String) -> StoreFuture<'_, Option<String>> {
        Box::pin(async move {
            let entries = self
                .entries
                .read()
                .map_err(|_| StoreError::Backend("cache lock poisoned".to_string()))?;
            Ok(entries.get(&key).cloned())
        })
    }
}
