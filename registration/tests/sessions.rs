//! Session lifecycle and wishlist behavior.

#![allow(clippy::unwrap_used)]

use conference_central_core::FixedClock;
use conference_central_memory::InMemoryStore;
use conference_central_registration::{
    ConferenceForm, Identity, RegistrationError, RegistrationService, SessionForm, SessionId,
    SessionType, queries,
};
use std::sync::Arc;

fn service() -> RegistrationService {
    RegistrationService::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(FixedClock::for_tests()),
    )
}

fn conference_form(name: &str) -> ConferenceForm {
    ConferenceForm {
        name: name.to_string(),
        description: None,
        topics: vec![],
        city: None,
        start_date: None,
        end_date: None,
        max_attendees: 10,
    }
}

fn session_form(name: &str, speaker: &str, session_type: SessionType) -> SessionForm {
    SessionForm {
        name: name.to_string(),
        highlights: None,
        speaker: speaker.to_string(),
        duration: "01:00".to_string(),
        session_type,
        date: None,
        start_time: "09:30".to_string(),
    }
}

#[tokio::test]
async fn organizer_creates_a_session() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");
    let conference = service
        .create_conference(&organizer, conference_form("RustConf"))
        .await
        .unwrap();

    let session = service
        .create_session(
            &organizer,
            conference.id,
            session_form("Ownership Deep Dive", "Ada", SessionType::Workshop),
        )
        .await
        .unwrap();

    assert_eq!(session.conference_id, conference.id);
    assert_eq!(session.start_time.to_string(), "09:30");

    // The conference carries the back-reference.
    let conference = service.get_conference(conference.id).await.unwrap();
    assert_eq!(conference.session_ids, vec![session.id]);
}

#[tokio::test]
async fn session_creation_is_organizer_only() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");
    let interloper = Identity::new("interloper", "mallory@example.com");
    let conference = service
        .create_conference(&organizer, conference_form("RustConf"))
        .await
        .unwrap();

    let err = service
        .create_session(
            &interloper,
            conference.id,
            session_form("Sneaky Talk", "Mallory", SessionType::Lecture),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Forbidden(_)));

    let conference = service.get_conference(conference.id).await.unwrap();
    assert!(conference.session_ids.is_empty());
}

#[tokio::test]
async fn malformed_times_are_rejected() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");
    let conference = service
        .create_conference(&organizer, conference_form("RustConf"))
        .await
        .unwrap();

    let mut bad_start = session_form("Talk", "Ada", SessionType::Lecture);
    bad_start.start_time = "25:00".to_string();
    let err = service
        .create_session(&organizer, conference.id, bad_start)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::InvalidArgument("Invalid start time format: 25:00".to_string())
    );

    let mut bad_duration = session_form("Talk", "Ada", SessionType::Lecture);
    bad_duration.duration = "9:30".to_string();
    let err = service
        .create_session(&organizer, conference.id, bad_duration)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::InvalidArgument("Invalid duration time format: 9:30".to_string())
    );
}

#[tokio::test]
async fn wishlist_add_and_remove() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");
    let attendee = Identity::new("attendee", "alice@example.com");
    let conference = service
        .create_conference(&organizer, conference_form("RustConf"))
        .await
        .unwrap();
    let session = service
        .create_session(
            &organizer,
            conference.id,
            session_form("Async in Practice", "Grace", SessionType::Lecture),
        )
        .await
        .unwrap();

    service
        .add_session_to_wishlist(&attendee, session.id)
        .await
        .unwrap();

    // Duplicates are rejected.
    let err = service
        .add_session_to_wishlist(&attendee, session.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(_)));

    let profile = service.get_profile(&attendee).await.unwrap();
    let wishlist = queries::wishlist_sessions(service.sessions(), &profile)
        .await
        .unwrap();
    assert_eq!(wishlist.len(), 1);
    assert_eq!(wishlist[0].name, "Async in Practice");

    service
        .remove_session_from_wishlist(&attendee, session.id)
        .await
        .unwrap();
    let err = service
        .remove_session_from_wishlist(&attendee, session.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(_)));
}

#[tokio::test]
async fn wishlisting_a_missing_session_is_not_found() {
    let service = service();
    let attendee = Identity::new("attendee", "alice@example.com");

    let err = service
        .add_session_to_wishlist(&attendee, SessionId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::NotFound { .. }));
}

#[tokio::test]
async fn session_queries_filter_by_speaker_and_type() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");
    let conference = service
        .create_conference(&organizer, conference_form("RustConf"))
        .await
        .unwrap();
    let other = service
        .create_conference(&organizer, conference_form("OtherConf"))
        .await
        .unwrap();

    for (conf, name, speaker, kind) in [
        (conference.id, "Keynote", "Ada", SessionType::Keynote),
        (conference.id, "Borrowck", "Ada", SessionType::Lecture),
        (conference.id, "Hands On", "Grace", SessionType::Workshop),
        (other.id, "Elsewhere", "Ada", SessionType::Lecture),
    ] {
        service
            .create_session(&organizer, conf, session_form(name, speaker, kind))
            .await
            .unwrap();
    }

    let conference = service.get_conference(conference.id).await.unwrap();
    let in_conf = queries::sessions_of_conference(service.sessions(), &conference)
        .await
        .unwrap();
    assert_eq!(in_conf.len(), 3);

    let by_ada = queries::sessions_by_speaker(service.sessions(), "Ada")
        .await
        .unwrap();
    assert_eq!(by_ada.len(), 3);

    let lectures = queries::sessions_by_type(service.sessions(), SessionType::Lecture)
        .await
        .unwrap();
    assert_eq!(lectures.len(), 2);
    assert_eq!(lectures[0].name, "Borrowck");
    assert_eq!(lectures[1].name, "Elsewhere");
}
