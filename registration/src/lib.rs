//! # Conference Central Registration
//!
//! The domain layer of the Conference Central service: user profiles,
//! conferences with bounded seating, sessions and per-user wishlists.
//!
//! The centerpiece is the [`RegistrationService`], which runs every
//! mutating operation as an optimistic transaction over a
//! [`RecordStore`](conference_central_core::RecordStore): read the records
//! at their current versions, apply the domain rules, commit all writes as
//! one atomic compare-and-set batch, and re-run the whole body on
//! contention. Seat accounting (`seats_available`) lives inside that loop,
//! so a conference can never be booked past capacity even under concurrent
//! registration for its last seat.
//!
//! Around the service:
//!
//! - [`queries`] — read-only filtered listings of conferences and sessions
//! - [`announce`] — periodic announcement texts (nearly-sold-out banner,
//!   featured speaker) pushed into an
//!   [`AnnouncementCache`](conference_central_core::AnnouncementCache)
//! - [`notify`] — post-commit notification seam for conference creation
//! - [`config`] / [`telemetry`] — environment-driven settings and tracing
//!   setup for embedding applications
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use conference_central_core::SystemClock;
//! use conference_central_memory::InMemoryStore;
//! use conference_central_registration::{ConferenceForm, Identity, RegistrationService};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RegistrationService::new(Arc::new(InMemoryStore::new()), Arc::new(SystemClock));
//! let organizer = Identity::new("user-1", "alice@example.com");
//! let form = ConferenceForm {
//!     name: "RustConf".into(),
//!     description: None,
//!     topics: vec!["rust".into()],
//!     city: Some("Berlin".into()),
//!     start_date: None,
//!     end_date: None,
//!     max_attendees: 100,
//! };
//! let conference = service.create_conference(&organizer, form).await?;
//! service.register_for_conference(&organizer, conference.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod announce;
pub mod config;
pub mod error;
pub mod notify;
pub mod queries;
pub mod service;
pub mod stores;
pub mod telemetry;
pub mod types;

pub use announce::{
    ANNOUNCEMENTS_KEY, DEFAULT_SELLOUT_THRESHOLD, FEATURED_SPEAKER_KEY,
    refresh_featured_speaker, refresh_sellout_announcement,
};
pub use config::{Config, RetryConfig};
pub use error::RegistrationError;
pub use notify::{NotificationSink, NullNotifier, RecordingNotifier};
pub use queries::{
    ConferenceFilter, conferences_created_by, query_conferences, sessions_by_speaker,
    sessions_by_type, sessions_of_conference, wishlist_sessions,
};
pub use service::RegistrationService;
pub use stores::{ConferenceStore, ProfileStore, SessionStore};
pub use types::{
    ClockTime, Conference, ConferenceForm, ConferenceId, ConferenceUpdateForm, Identity, Profile,
    ProfileForm, Session, SessionForm, SessionId, SessionType, TeeShirtSize, UserId,
};
