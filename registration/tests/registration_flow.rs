//! End-to-end registration flows against the in-memory backend.

#![allow(clippy::unwrap_used)]

use conference_central_core::FixedClock;
use conference_central_memory::InMemoryStore;
use conference_central_registration::{
    ConferenceForm, ConferenceUpdateForm, Identity, NotificationSink, ProfileForm,
    RecordingNotifier, RegistrationError, RegistrationService, TeeShirtSize,
};
use std::sync::Arc;

fn service() -> RegistrationService {
    RegistrationService::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(FixedClock::for_tests()),
    )
}

fn form(name: &str, max_attendees: u32) -> ConferenceForm {
    ConferenceForm {
        name: name.to_string(),
        description: None,
        topics: vec![],
        city: None,
        start_date: None,
        end_date: None,
        max_attendees,
    }
}

#[tokio::test]
async fn register_and_unregister_round_trip() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");
    let attendee = Identity::new("attendee", "alice@example.com");

    let conference = service
        .create_conference(&organizer, form("RustConf", 2))
        .await
        .unwrap();
    assert_eq!(conference.seats_available, 2);

    service
        .register_for_conference(&attendee, conference.id)
        .await
        .unwrap();

    let profile = service.get_profile(&attendee).await.unwrap();
    assert!(profile.is_attending(conference.id));
    let conference = service.get_conference(conference.id).await.unwrap();
    assert_eq!(conference.seats_available, 1);

    service
        .unregister_from_conference(&attendee, conference.id)
        .await
        .unwrap();

    let profile = service.get_profile(&attendee).await.unwrap();
    assert!(!profile.is_attending(conference.id));
    let conference = service.get_conference(conference.id).await.unwrap();
    assert_eq!(conference.seats_available, 2);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");
    let attendee = Identity::new("attendee", "alice@example.com");

    let conference = service
        .create_conference(&organizer, form("RustConf", 5))
        .await
        .unwrap();
    service
        .register_for_conference(&attendee, conference.id)
        .await
        .unwrap();

    let err = service
        .register_for_conference(&attendee, conference.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(_)));

    // The failed attempt must not consume a seat.
    let conference = service.get_conference(conference.id).await.unwrap();
    assert_eq!(conference.seats_available, 4);
}

#[tokio::test]
async fn registering_for_missing_conference_is_not_found() {
    let service = service();
    let attendee = Identity::new("attendee", "alice@example.com");

    let err = service
        .register_for_conference(
            &attendee,
            conference_central_registration::ConferenceId::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::NotFound { .. }));
}

#[tokio::test]
async fn unregistering_when_not_registered_is_a_conflict() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");
    let attendee = Identity::new("attendee", "alice@example.com");

    let conference = service
        .create_conference(&organizer, form("RustConf", 5))
        .await
        .unwrap();

    let err = service
        .unregister_from_conference(&attendee, conference.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(_)));

    let conference = service.get_conference(conference.id).await.unwrap();
    assert_eq!(conference.seats_available, 5);
}

#[tokio::test]
async fn sold_out_conference_rejects_registration() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");

    let conference = service
        .create_conference(&organizer, form("Tiny", 1))
        .await
        .unwrap();

    let first = Identity::new("first", "first@example.com");
    let second = Identity::new("second", "second@example.com");

    service
        .register_for_conference(&first, conference.id)
        .await
        .unwrap();
    let err = service
        .register_for_conference(&second, conference.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Conflict(_)));
}

#[tokio::test]
async fn first_profile_fetch_creates_defaults() {
    let service = service();
    let identity = Identity::new("user-1", "alice.smith@example.com");

    let profile = service.get_profile(&identity).await.unwrap();
    assert_eq!(profile.display_name, "alice.smith");
    assert_eq!(profile.tee_shirt_size, TeeShirtSize::NotSpecified);
    assert!(profile.conferences_attending.is_empty());

    // The default is persisted, not recomputed.
    let (stored, _) = service
        .profiles()
        .get(&identity.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, profile);
}

#[tokio::test]
async fn save_profile_overrides_only_provided_fields() {
    let service = service();
    let identity = Identity::new("user-1", "alice@example.com");

    let profile = service
        .save_profile(
            &identity,
            ProfileForm {
                display_name: None,
                tee_shirt_size: Some(TeeShirtSize::L),
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.display_name, "alice");
    assert_eq!(profile.tee_shirt_size, TeeShirtSize::L);

    let profile = service
        .save_profile(
            &identity,
            ProfileForm {
                display_name: Some("Alice".to_string()),
                tee_shirt_size: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.display_name, "Alice");
    assert_eq!(profile.tee_shirt_size, TeeShirtSize::L);
}

#[tokio::test]
async fn creation_notice_is_dispatched_after_commit() {
    let notifier = Arc::new(RecordingNotifier::new());
    let service = RegistrationService::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(FixedClock::for_tests()),
    )
    .with_notifier(Arc::clone(&notifier) as Arc<dyn NotificationSink>);
    let organizer = Identity::new("organizer", "org@example.com");

    let conference = service
        .create_conference(&organizer, form("RustConf", 5))
        .await
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, organizer);
    assert_eq!(sent[0].1.id, conference.id);

    // A rejected creation never notifies.
    let _ = service.create_conference(&organizer, form("", 5)).await;
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn create_conference_requires_a_name() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");

    let err = service
        .create_conference(&organizer, form("", 5))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidArgument(_)));
}

#[tokio::test]
async fn update_conference_is_organizer_only() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");
    let interloper = Identity::new("interloper", "mallory@example.com");

    let conference = service
        .create_conference(&organizer, form("RustConf", 5))
        .await
        .unwrap();

    let update = ConferenceUpdateForm {
        city: Some("Berlin".to_string()),
        ..ConferenceUpdateForm::default()
    };

    let err = service
        .update_conference(&interloper, conference.id, update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::Forbidden(_)));

    let updated = service
        .update_conference(&organizer, conference.id, update)
        .await
        .unwrap();
    assert_eq!(updated.city.as_deref(), Some("Berlin"));
    assert_eq!(updated.name, "RustConf");
}

#[tokio::test]
async fn shrinking_capacity_below_attendance_is_rejected() {
    let service = service();
    let organizer = Identity::new("organizer", "org@example.com");

    let conference = service
        .create_conference(&organizer, form("RustConf", 3))
        .await
        .unwrap();
    for user in ["a", "b"] {
        let identity = Identity::new(user, format!("{user}@example.com"));
        service
            .register_for_conference(&identity, conference.id)
            .await
            .unwrap();
    }

    let err = service
        .update_conference(
            &organizer,
            conference.id,
            ConferenceUpdateForm {
                max_attendees: Some(1),
                ..ConferenceUpdateForm::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::InvalidArgument(_)));

    // Shrinking down to exactly the current attendance is allowed and
    // leaves zero seats.
    let updated = service
        .update_conference(
            &organizer,
            conference.id,
            ConferenceUpdateForm {
                max_attendees: Some(2),
                ..ConferenceUpdateForm::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.seats_available, 0);
}
