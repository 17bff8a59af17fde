//! Typed repositories over the record store.
//!
//! `ProfileStore`, `ConferenceStore` and `SessionStore` wrap the shared
//! [`RecordStore`] backend with entity (de)serialization and record-kind
//! namespacing. They are plain keyed-record repositories: no caching, no
//! eviction. Cross-entity invariants are coordinated one level up, by the
//! [`RegistrationService`](crate::RegistrationService), which combines
//! writes prepared here into atomic commits.

use crate::types::{Conference, ConferenceId, Profile, Session, SessionId, UserId};
use conference_central_core::{RecordKey, RecordStore, StoreError, Version, VersionedRecord, Write};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(record: &VersionedRecord) -> Result<T, StoreError> {
    serde_json::from_slice(&record.payload).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Repository of [`Profile`] records, keyed by user id.
#[derive(Clone)]
pub struct ProfileStore {
    backend: Arc<dyn RecordStore>,
}

impl ProfileStore {
    /// Record kind under which profiles are stored.
    pub const KIND: &'static str = "profile";

    /// Wrap the shared backend.
    #[must_use]
    pub fn new(backend: Arc<dyn RecordStore>) -> Self {
        Self { backend }
    }

    /// Record key for a user's profile.
    #[must_use]
    pub fn key(user_id: &UserId) -> RecordKey {
        RecordKey::new(Self::KIND, user_id.as_str())
    }

    /// Load a profile with the version it was read at.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails or the record does not
    /// deserialize.
    pub async fn get(&self, user_id: &UserId) -> Result<Option<(Profile, Version)>, StoreError> {
        match self.backend.get(Self::key(user_id)).await? {
            Some(record) => Ok(Some((decode(&record)?, record.version))),
            None => Ok(None),
        }
    }

    /// Prepare a compare-and-set write for a multi-record commit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the profile does not
    /// serialize.
    pub fn write(profile: &Profile, expected: Version) -> Result<Write, StoreError> {
        Ok(Write::expecting(
            Self::key(&profile.user_id),
            expected,
            encode(profile)?,
        ))
    }
}

/// Repository of [`Conference`] records.
#[derive(Clone)]
pub struct ConferenceStore {
    backend: Arc<dyn RecordStore>,
}

impl ConferenceStore {
    /// Record kind under which conferences are stored.
    pub const KIND: &'static str = "conference";

    /// Wrap the shared backend.
    #[must_use]
    pub fn new(backend: Arc<dyn RecordStore>) -> Self {
        Self { backend }
    }

    /// Record key for a conference.
    #[must_use]
    pub fn key(id: ConferenceId) -> RecordKey {
        RecordKey::new(Self::KIND, id.to_string())
    }

    /// Load a conference with the version it was read at.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails or the record does not
    /// deserialize.
    pub async fn get(&self, id: ConferenceId) -> Result<Option<(Conference, Version)>, StoreError> {
        match self.backend.get(Self::key(id)).await? {
            Some(record) => Ok(Some((decode(&record)?, record.version))),
            None => Ok(None),
        }
    }

    /// Prepare a compare-and-set write for a multi-record commit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the conference does not
    /// serialize.
    pub fn write(conference: &Conference, expected: Version) -> Result<Write, StoreError> {
        Ok(Write::expecting(
            Self::key(conference.id),
            expected,
            encode(conference)?,
        ))
    }

    /// Load every conference.
    ///
    /// Backs the filtered listing queries and the announcement job; order
    /// is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails or a record does not
    /// deserialize.
    pub async fn list(&self) -> Result<Vec<Conference>, StoreError> {
        let records = self.backend.scan(Self::KIND.to_string()).await?;
        records.iter().map(decode).collect()
    }

    /// Conferences created by the given user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails or a record does not
    /// deserialize.
    pub async fn list_by_organizer(&self, user_id: &UserId) -> Result<Vec<Conference>, StoreError> {
        let mut conferences: Vec<Conference> = self
            .list()
            .await?
            .into_iter()
            .filter(|c| c.is_organized_by(user_id))
            .collect();
        conferences.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(conferences)
    }
}

/// Repository of [`Session`] records.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn RecordStore>,
}

impl SessionStore {
    /// Record kind under which sessions are stored.
    pub const KIND: &'static str = "session";

    /// Wrap the shared backend.
    #[must_use]
    pub fn new(backend: Arc<dyn RecordStore>) -> Self {
        Self { backend }
    }

    /// Record key for a session.
    #[must_use]
    pub fn key(id: SessionId) -> RecordKey {
        RecordKey::new(Self::KIND, id.to_string())
    }

    /// Load a session with the version it was read at.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails or the record does not
    /// deserialize.
    pub async fn get(&self, id: SessionId) -> Result<Option<(Session, Version)>, StoreError> {
        match self.backend.get(Self::key(id)).await? {
            Some(record) => Ok(Some((decode(&record)?, record.version))),
            None => Ok(None),
        }
    }

    /// Prepare a compare-and-set write for a multi-record commit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the session does not
    /// serialize.
    pub fn write(session: &Session, expected: Version) -> Result<Write, StoreError> {
        Ok(Write::expecting(
            Self::key(session.id),
            expected,
            encode(session)?,
        ))
    }

    /// Load every session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend fails or a record does not
    /// deserialize.
    pub async fn list(&self) -> Result<Vec<Session>, StoreError> {
        let records = self.backend.scan(Self::KIND.to_string()).await?;
        records.iter().map(decode).collect()
    }
}
