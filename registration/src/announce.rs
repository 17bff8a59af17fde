//! Announcement refresh jobs.
//!
//! The original deployment recomputed these texts on a cron schedule and
//! parked them in memcache for the landing page to read. Here they are
//! plain async functions over the stores and an [`AnnouncementCache`];
//! wiring them to a scheduler is left to the embedding application.

use crate::error::RegistrationError;
use crate::stores::{ConferenceStore, SessionStore};
use conference_central_core::AnnouncementCache;
use std::collections::BTreeMap;

/// Cache key under which the sell-out announcement is stored.
pub const ANNOUNCEMENTS_KEY: &str = "RECENT_ANNOUNCEMENTS";

/// Cache key under which the featured-speaker announcement is stored.
pub const FEATURED_SPEAKER_KEY: &str = "FEATURED_SPEAKER";

/// Seats-available threshold below which a conference counts as nearly
/// sold out.
pub const DEFAULT_SELLOUT_THRESHOLD: u32 = 5;

/// Recompute the nearly-sold-out announcement.
///
/// Conferences with `0 < seats_available < threshold` are listed by name,
/// sorted, and the resulting text is written under [`ANNOUNCEMENTS_KEY`].
/// When no conference qualifies the cache is left untouched and `None` is
/// returned, so a stale banner ages out rather than being replaced by an
/// empty one.
///
/// # Errors
///
/// Returns [`RegistrationError::Storage`] if the scan or the cache write
/// fails.
pub async fn refresh_sellout_announcement(
    conferences: &ConferenceStore,
    cache: &dyn AnnouncementCache,
    threshold: u32,
) -> Result<Option<String>, RegistrationError> {
    let mut nearly_sold_out: Vec<String> = conferences
        .list()
        .await?
        .into_iter()
        .filter(|c| c.seats_available > 0 && c.seats_available < threshold)
        .map(|c| c.name)
        .collect();

    if nearly_sold_out.is_empty() {
        tracing::debug!("no nearly-sold-out conferences, announcement unchanged");
        return Ok(None);
    }
    nearly_sold_out.sort();

    let text = format!(
        "Last chance to attend! The following conferences are nearly sold out: {}",
        nearly_sold_out.join(", ")
    );
    cache
        .put(ANNOUNCEMENTS_KEY.to_string(), text.clone())
        .await?;
    tracing::info!(conferences = nearly_sold_out.len(), "sell-out announcement refreshed");
    Ok(Some(text))
}

/// Recompute the featured-speaker announcement.
///
/// A speaker presenting more than one session is featured; when several
/// qualify, the one with the most sessions wins (ties broken by name).
/// The text lists that speaker's sessions sorted by name and is written
/// under [`FEATURED_SPEAKER_KEY`]. With no qualifying speaker the cache is
/// left untouched and `None` is returned.
///
/// # Errors
///
/// Returns [`RegistrationError::Storage`] if the scan or the cache write
/// fails.
pub async fn refresh_featured_speaker(
    sessions: &SessionStore,
    cache: &dyn AnnouncementCache,
) -> Result<Option<String>, RegistrationError> {
    let mut by_speaker: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for session in sessions.list().await? {
        if session.speaker.is_empty() {
            continue;
        }
        by_speaker
            .entry(session.speaker.clone())
            .or_default()
            .push(session.name);
    }

    // Reversed name comparison so that ties on session count go to the
    // alphabetically first speaker.
    let featured = by_speaker
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .max_by(|(a_name, a), (b_name, b)| a.len().cmp(&b.len()).then(b_name.cmp(a_name)));

    let Some((speaker, mut session_names)) = featured else {
        tracing::debug!("no repeat speaker, featured-speaker announcement unchanged");
        return Ok(None);
    };
    session_names.sort();

    let text = format!(
        "{} is presenting the following sessions: {}",
        speaker,
        session_names.join(", ")
    );
    cache
        .put(FEATURED_SPEAKER_KEY.to_string(), text.clone())
        .await?;
    tracing::info!(%speaker, "featured-speaker announcement refreshed");
    Ok(Some(text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Conference, ConferenceForm, ConferenceId, Session, SessionId, UserId};
    use chrono::Utc;
    use conference_central_core::{RecordStore, Version};
    use conference_central_memory::{InMemoryCache, InMemoryStore};
    use std::sync::Arc;

    async fn seed_conference(backend: &Arc<dyn RecordStore>, name: &str, max: u32, taken: u32) {
        let mut conference = Conference::from_form(
            ConferenceId::new(),
            &UserId::from("organizer"),
            ConferenceForm {
                name: name.to_string(),
                description: None,
                topics: vec![],
                city: None,
                start_date: None,
                end_date: None,
                max_attendees: max,
            },
            Utc::now(),
        );
        for _ in 0..taken {
            assert!(conference.take_seat());
        }
        backend
            .commit(vec![
                ConferenceStore::write(&conference, Version::INITIAL).unwrap(),
            ])
            .await
            .unwrap();
    }

    async fn seed_session(backend: &Arc<dyn RecordStore>, name: &str, speaker: &str) {
        let session = Session {
            id: SessionId::new(),
            conference_id: ConferenceId::new(),
            name: name.to_string(),
            highlights: None,
            speaker: speaker.to_string(),
            duration: "01:00".parse().unwrap(),
            session_type: crate::types::SessionType::Lecture,
            date: None,
            start_time: "09:00".parse().unwrap(),
        };
        backend
            .commit(vec![SessionStore::write(&session, Version::INITIAL).unwrap()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sellout_lists_only_nearly_full_conferences() {
        let backend: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let conferences = ConferenceStore::new(Arc::clone(&backend));
        let cache = InMemoryCache::new();

        seed_conference(&backend, "Roomy", 100, 0).await; // plenty of seats
        seed_conference(&backend, "Zealous", 10, 7).await; // 3 left
        seed_conference(&backend, "Almost", 10, 9).await; // 1 left
        seed_conference(&backend, "Full", 10, 10).await; // sold out

        let text = refresh_sellout_announcement(&conferences, &cache, DEFAULT_SELLOUT_THRESHOLD)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            text,
            "Last chance to attend! The following conferences are nearly sold out: Almost, Zealous"
        );
        assert_eq!(
            cache.get(ANNOUNCEMENTS_KEY.to_string()).await.unwrap(),
            Some(text)
        );
    }

    #[tokio::test]
    async fn sellout_without_candidates_leaves_cache_untouched() {
        let backend: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let conferences = ConferenceStore::new(Arc::clone(&backend));
        let cache = InMemoryCache::new();

        seed_conference(&backend, "Roomy", 100, 0).await;

        let refreshed =
            refresh_sellout_announcement(&conferences, &cache, DEFAULT_SELLOUT_THRESHOLD)
                .await
                .unwrap();
        assert!(refreshed.is_none());
        assert!(
            cache
                .get(ANNOUNCEMENTS_KEY.to_string())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn featured_speaker_requires_more_than_one_session() {
        let backend: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let sessions = SessionStore::new(Arc::clone(&backend));
        let cache = InMemoryCache::new();

        seed_session(&backend, "Intro", "Ada").await;
        let refreshed = refresh_featured_speaker(&sessions, &cache).await.unwrap();
        assert!(refreshed.is_none());

        seed_session(&backend, "Advanced", "Ada").await;
        seed_session(&backend, "Unrelated", "Grace").await;

        let text = refresh_featured_speaker(&sessions, &cache)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            text,
            "Ada is presenting the following sessions: Advanced, Intro"
        );
        assert_eq!(
            cache.get(FEATURED_SPEAKER_KEY.to_string()).await.unwrap(),
            Some(text)
        );
    }

    #[tokio::test]
    async fn featured_speaker_prefers_the_busiest_speaker() {
        let backend: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let sessions = SessionStore::new(Arc::clone(&backend));
        let cache = InMemoryCache::new();

        seed_session(&backend, "A", "Zoe").await;
        seed_session(&backend, "B", "Zoe").await;
        seed_session(&backend, "C", "Zoe").await;
        seed_session(&backend, "D", "Ada").await;
        seed_session(&backend, "E", "Ada").await;

        let text = refresh_featured_speaker(&sessions, &cache)
            .await
            .unwrap()
            .unwrap();
        assert!(text.starts_with("Zoe is presenting"));
    }
}
