//! In-memory [`RecordStore`] implementation.

use conference_central_core::{
    RecordKey, RecordStore, StoreError, StoreFuture, Version, VersionedRecord, Write,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// Single-process record store backed by a `HashMap` under one lock.
///
/// All commits serialize through the write lock, which makes every batch
/// atomic and every version check race-free: a concurrent commit either
/// lands entirely before this one (and is observed by the version checks)
/// or entirely after it.
///
/// # Example
///
/// ```
/// use conference_central_core::{RecordKey, RecordStore, Version, Write};
/// use conference_central_memory::InMemoryStore;
///
/// # tokio_test::block_on(async {
/// let store = InMemoryStore::new();
/// let key = RecordKey::new("conference", "abc");
///
/// store
///     .commit(vec![Write::expecting(key.clone(), Version::INITIAL, b"{}".to_vec())])
///     .await
///     .unwrap();
///
/// let record = store.get(key).await.unwrap().unwrap();
/// assert_eq!(record.version, Version::new(1));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<RecordKey, (Version, Vec<u8>)>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored, across all kinds.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn len(&self) -> usize {
        self.records.read().expect("record lock poisoned").len()
    }

    /// Whether the store holds no records.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryStore {
    fn get(&self, key: RecordKey) -> StoreFuture<'_, Option<VersionedRecord>> {
        Box::pin(async move {
            let records = self
                .records
                .read()
                .map_err(|_| StoreError::Backend("record lock poisoned".to_string()))?;

            Ok(records.get(&key).map(|(version, payload)| VersionedRecord {
                key,
                version: *version,
                payload: payload.clone(),
            }))
        })
    }

    fn commit(&self, writes: Vec<Write>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut records = self
                .records
                .write()
                .map_err(|_| StoreError::Backend("record lock poisoned".to_string()))?;

            // Validate every assertion before touching anything, so a failed
            // batch leaves all records at their pre-call values.
            for write in &writes {
                if let Some(expected) = write.expected {
                    let actual = records
                        .get(&write.key)
                        .map_or(Version::INITIAL, |(version, _)| *version);
                    if actual != expected {
                        return Err(StoreError::VersionConflict {
                            key: write.key.clone(),
                            expected,
                            actual,
                        });
                    }
                }
            }

            for write in writes {
                let next = records
                    .get(&write.key)
                    .map_or(Version::INITIAL, |(version, _)| *version)
                    .next();
                records.insert(write.key, (next, write.payload));
            }

            Ok(())
        })
    }

    fn scan(&self, kind: String) -> StoreFuture<'_, Vec<VersionedRecord>> {
        Box::pin(async move {
            let records = self
                .records
                .read()
                .map_err(|_| StoreError::Backend("record lock poisoned".to_string()))?;

            Ok(records
                .iter()
                .filter(|(key, _)| key.kind() == kind)
                .map(|(key, (version, payload))| VersionedRecord {
                    key: key.clone(),
                    version: *version,
                    payload: payload.clone(),
                })
                .collect())
        })
    }
}
