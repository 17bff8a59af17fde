//! Read-only listing queries over conferences and sessions.
//!
//! These back the external query API: plain store-level scans with
//! equality/range filters, entirely outside the registration invariant.
//! Results are sorted by name for stable presentation.

use crate::error::RegistrationError;
use crate::stores::{ConferenceStore, SessionStore};
use crate::types::{Conference, Profile, Session, SessionType, UserId};
use chrono::NaiveDate;

/// Filter for conference listings. All criteria are optional and combined
/// with AND.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConferenceFilter {
    /// Exact host-city match.
    pub city: Option<String>,
    /// Conference must list this topic.
    pub topic: Option<String>,
    /// At least this many seats still open.
    pub min_seats_available: Option<u32>,
    /// Conference must start on or after this date.
    pub starts_on_or_after: Option<NaiveDate>,
}

impl ConferenceFilter {
    fn matches(&self, conference: &Conference) -> bool {
        if let Some(city) = &self.city {
            if conference.city.as_deref() != Some(city.as_str()) {
                return false;
            }
        }
        if let Some(topic) = &self.topic {
            if !conference.topics.contains(topic) {
                return false;
            }
        }
        if let Some(min_seats) = self.min_seats_available {
            if conference.seats_available < min_seats {
                return false;
            }
        }
        if let Some(earliest) = self.starts_on_or_after {
            match conference.start_date {
                Some(start) if start >= earliest => {}
                _ => return false,
            }
        }
        true
    }
}

/// Conferences matching the filter, sorted by name.
///
/// # Errors
///
/// Returns [`RegistrationError::Storage`] if the scan fails.
pub async fn query_conferences(
    store: &ConferenceStore,
    filter: &ConferenceFilter,
) -> Result<Vec<Conference>, RegistrationError> {
    let mut conferences: Vec<Conference> = store
        .list()
        .await?
        .into_iter()
        .filter(|c| filter.matches(c))
        .collect();
    conferences.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(conferences)
}

/// Conferences organized by the given user, sorted by name.
///
/// # Errors
///
/// Returns [`RegistrationError::Storage`] if the scan fails.
pub async fn conferences_created_by(
    store: &ConferenceStore,
    user_id: &UserId,
) -> Result<Vec<Conference>, RegistrationError> {
    Ok(store.list_by_organizer(user_id).await?)
}

/// All sessions scheduled under the given conference, sorted by name.
///
/// # Errors
///
/// Returns [`RegistrationError::Storage`] if the scan fails.
pub async fn sessions_of_conference(
    store: &SessionStore,
    conference: &Conference,
) -> Result<Vec<Session>, RegistrationError> {
    let mut sessions: Vec<Session> = store
        .list()
        .await?
        .into_iter()
        .filter(|s| s.conference_id == conference.id)
        .collect();
    sessions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sessions)
}

/// Sessions given by the named speaker, across all conferences.
///
/// # Errors
///
/// Returns [`RegistrationError::Storage`] if the scan fails.
pub async fn sessions_by_speaker(
    store: &SessionStore,
    speaker: &str,
) -> Result<Vec<Session>, RegistrationError> {
    let mut sessions: Vec<Session> = store
        .list()
        .await?
        .into_iter()
        .filter(|s| s.speaker == speaker)
        .collect();
    sessions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sessions)
}

/// Sessions of the given type, across all conferences.
///
/// # Errors
///
/// Returns [`RegistrationError::Storage`] if the scan fails.
pub async fn sessions_by_type(
    store: &SessionStore,
    session_type: SessionType,
) -> Result<Vec<Session>, RegistrationError> {
    let mut sessions: Vec<Session> = store
        .list()
        .await?
        .into_iter()
        .filter(|s| s.session_type == session_type)
        .collect();
    sessions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sessions)
}

/// Resolve the sessions on a profile's wishlist, skipping ids whose
/// session has since been deleted (the wishlist holds weak references).
///
/// # Errors
///
/// Returns [`RegistrationError::Storage`] if a lookup fails.
pub async fn wishlist_sessions(
    store: &SessionStore,
    profile: &Profile,
) -> Result<Vec<Session>, RegistrationError> {
    let mut sessions = Vec::with_capacity(profile.session_wishlist.len());
    for session_id in &profile.session_wishlist {
        if let Some((session, _)) = store.get(*session_id).await? {
            sessions.push(session);
        }
    }
    sessions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sessions)
}
