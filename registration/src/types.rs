//! Domain types for Conference Central.
//!
//! This module contains the value objects, entities and client-facing forms
//! of the registration service: user profiles, conferences with their seat
//! capacity, and sessions scoped to a conference.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Stable external identity key of a user.
///
/// Supplied by the authentication layer with every call; the registration
/// service never mints these itself. Immutable after profile creation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a `UserId` from an externally supplied identity string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a conference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConferenceId(Uuid);

impl ConferenceId {
    /// Creates a new random `ConferenceId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ConferenceId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConferenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random `SessionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `SessionId` from a `Uuid`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Caller identity
// ============================================================================

/// Authenticated caller, as resolved by the (external) identity layer.
///
/// The registration service never authenticates anyone; it trusts the
/// `user_id`/`email` pair handed to it and uses the email only to derive a
/// default display name for lazily created profiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identity key of the caller.
    pub user_id: UserId,
    /// The caller's main e-mail address.
    pub email: String,
}

impl Identity {
    /// Pair a user id with its e-mail address.
    #[must_use]
    pub fn new(user_id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }

    /// Default display name: the local part of the e-mail address.
    ///
    /// For `lemoncake@example.com` the display name becomes `lemoncake`.
    #[must_use]
    pub fn default_display_name(&self) -> String {
        self.email
            .split_once('@')
            .map_or(self.email.as_str(), |(local, _)| local)
            .to_string()
    }
}

// ============================================================================
// Wall-clock time (HH:MM)
// ============================================================================

/// Error type for [`ClockTime`] parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid time format (expected 24-hour HH:MM): {0}")]
pub struct ParseClockTimeError(String);

/// A 24-hour wall-clock value, parsed strictly from `HH:MM`.
///
/// Both digits are required: `"09:30"` parses, `"9:30"` and `"25:00"` do
/// not. Session start times and durations carry this type, so a session can
/// never be constructed with a malformed time field.
///
/// Serialized as the `"HH:MM"` string.
///
/// # Examples
///
/// ```
/// use conference_central_registration::types::ClockTime;
///
/// let time: ClockTime = "09:30".parse().unwrap();
/// assert_eq!(time.hour(), 9);
/// assert_eq!(time.minute(), 30);
/// assert_eq!(time.to_string(), "09:30");
///
/// assert!("25:00".parse::<ClockTime>().is_err());
/// assert!("9:30".parse::<ClockTime>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Construct from hour and minute components.
    ///
    /// # Errors
    ///
    /// Returns [`ParseClockTimeError`] if `hour > 23` or `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ParseClockTimeError> {
        if hour > 23 || minute > 59 {
            return Err(ParseClockTimeError(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    /// Hour component (0–23).
    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    /// Minute component (0–59).
    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(ParseClockTimeError(s.to_string()));
        }

        let digit = |b: u8| -> Option<u8> { b.is_ascii_digit().then(|| b - b'0') };
        let (Some(h1), Some(h2), Some(m1), Some(m2)) =
            (digit(bytes[0]), digit(bytes[1]), digit(bytes[3]), digit(bytes[4]))
        else {
            return Err(ParseClockTimeError(s.to_string()));
        };

        Self::new(h1 * 10 + h2, m1 * 10 + m2).map_err(|_| ParseClockTimeError(s.to_string()))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ParseClockTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

// ============================================================================
// Enums
// ============================================================================

/// T-shirt size recorded on a profile.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)] // Variants are self-describing sizes
pub enum TeeShirtSize {
    #[default]
    NotSpecified,
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
    Xxxl,
}

/// Kind of conference session.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)] // Variants are self-describing kinds
pub enum SessionType {
    #[default]
    NotSpecified,
    Keynote,
    Lecture,
    Workshop,
}

// ============================================================================
// Entities
// ============================================================================

/// Per-user record of display preferences and conference/session
/// memberships.
///
/// Created lazily the first time any operation touches the user's profile.
/// Membership containers are sets, so duplicates cannot occur by
/// construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable external identity key; immutable after creation.
    pub user_id: UserId,
    /// Name shown for the user on this system.
    pub display_name: String,
    /// The user's main e-mail address.
    pub main_email: String,
    /// The user's tee shirt size.
    pub tee_shirt_size: TeeShirtSize,
    /// Conferences the user is registered to attend.
    pub conferences_attending: BTreeSet<ConferenceId>,
    /// Sessions the user has saved for later.
    pub session_wishlist: BTreeSet<SessionId>,
}

impl Profile {
    /// Default profile for a caller that has never been seen before.
    ///
    /// The display name is derived from the e-mail local part.
    #[must_use]
    pub fn default_for(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            display_name: identity.default_display_name(),
            main_email: identity.email.clone(),
            tee_shirt_size: TeeShirtSize::NotSpecified,
            conferences_attending: BTreeSet::new(),
            session_wishlist: BTreeSet::new(),
        }
    }

    /// Whether the user is registered for the given conference.
    #[must_use]
    pub fn is_attending(&self, conference_id: ConferenceId) -> bool {
        self.conferences_attending.contains(&conference_id)
    }

    /// Whether the session is already on the wishlist.
    #[must_use]
    pub fn has_wishlisted(&self, session_id: SessionId) -> bool {
        self.session_wishlist.contains(&session_id)
    }
}

/// An event with a seat-capacity invariant.
///
/// `seats_available` only ever moves through [`Conference::take_seat`] and
/// [`Conference::release_seat`], which keep
/// `0 <= seats_available <= max_attendees` at all times.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    /// Unique identifier.
    pub id: ConferenceId,
    /// `user_id` of the organizing profile.
    pub organizer_user_id: UserId,
    /// Conference name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Host city.
    pub city: Option<String>,
    /// Topics discussed at the conference.
    pub topics: BTreeSet<String>,
    /// First day of the conference.
    pub start_date: Option<NaiveDate>,
    /// Last day of the conference.
    pub end_date: Option<NaiveDate>,
    /// Seat capacity, set at creation.
    pub max_attendees: u32,
    /// Seats still open for registration.
    pub seats_available: u32,
    /// Back-references to sessions scheduled under this conference.
    ///
    /// Relation only, no ownership: deleting a session does not require
    /// touching the conference and vice versa.
    pub session_ids: Vec<SessionId>,
    /// When the conference record was created.
    pub created_at: DateTime<Utc>,
}

impl Conference {
    /// Build a new conference from a creation form.
    ///
    /// All seats start available.
    #[must_use]
    pub fn from_form(
        id: ConferenceId,
        organizer: &UserId,
        form: ConferenceForm,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            organizer_user_id: organizer.clone(),
            name: form.name,
            description: form.description,
            city: form.city,
            topics: form.topics.into_iter().collect(),
            start_date: form.start_date,
            end_date: form.end_date,
            max_attendees: form.max_attendees,
            seats_available: form.max_attendees,
            session_ids: Vec::new(),
            created_at,
        }
    }

    /// Seats already taken by registrations.
    #[must_use]
    pub const fn seats_taken(&self) -> u32 {
        self.max_attendees - self.seats_available
    }

    /// Whether any seat is still open.
    #[must_use]
    pub const fn has_seats(&self) -> bool {
        self.seats_available > 0
    }

    /// Claim one seat. Returns `false` (and changes nothing) when the
    /// conference is sold out.
    pub const fn take_seat(&mut self) -> bool {
        if self.seats_available == 0 {
            return false;
        }
        self.seats_available -= 1;
        true
    }

    /// Return one seat to the pool, capped at `max_attendees` so accounting
    /// drift can never inflate capacity.
    pub const fn release_seat(&mut self) {
        if self.seats_available < self.max_attendees {
            self.seats_available += 1;
        }
    }

    /// Whether the given user organizes this conference.
    #[must_use]
    pub fn is_organized_by(&self, user_id: &UserId) -> bool {
        self.organizer_user_id == *user_id
    }

    /// Apply a field-level update; fields absent from the form retain
    /// their prior values.
    ///
    /// Changing `max_attendees` re-derives `seats_available` so that the
    /// seats already taken stay taken.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RegistrationError::InvalidArgument`] if the new
    /// capacity would fall below the seats already taken, or if the new
    /// name is empty.
    pub fn apply_update(
        &mut self,
        form: ConferenceUpdateForm,
    ) -> Result<(), crate::RegistrationError> {
        if let Some(name) = form.name {
            if name.is_empty() {
                return Err(crate::RegistrationError::InvalidArgument(
                    "The name is required".to_string(),
                ));
            }
            self.name = name;
        }
        if let Some(description) = form.description {
            self.description = Some(description);
        }
        if let Some(topics) = form.topics {
            self.topics = topics.into_iter().collect();
        }
        if let Some(city) = form.city {
            self.city = Some(city);
        }
        if let Some(start_date) = form.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(end_date) = form.end_date {
            self.end_date = Some(end_date);
        }
        if let Some(max_attendees) = form.max_attendees {
            let taken = self.seats_taken();
            if max_attendees < taken {
                return Err(crate::RegistrationError::InvalidArgument(format!(
                    "maxAttendees {max_attendees} is below the {taken} seats already taken"
                )));
            }
            self.max_attendees = max_attendees;
            self.seats_available = max_attendees - taken;
        }
        Ok(())
    }
}

/// A scheduled talk belonging to a conference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier.
    pub id: SessionId,
    /// The conference this session is scheduled under.
    pub conference_id: ConferenceId,
    /// Session name.
    pub name: String,
    /// What makes this session worth attending.
    pub highlights: Option<String>,
    /// Name of the speaker.
    pub speaker: String,
    /// Length of the session as wall-clock `HH:MM`.
    pub duration: ClockTime,
    /// Kind of session.
    pub session_type: SessionType,
    /// Day the session takes place.
    pub date: Option<NaiveDate>,
    /// Start of the session as wall-clock `HH:MM`.
    pub start_time: ClockTime,
}

// ============================================================================
// Forms
// ============================================================================

/// Profile form sent from the client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    /// New display name; `None` keeps the current (or default) one.
    pub display_name: Option<String>,
    /// New tee shirt size; `None` keeps the current one.
    pub tee_shirt_size: Option<TeeShirtSize>,
}

/// Conference creation form sent from the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceForm {
    /// The name of the conference. Required.
    pub name: String,
    /// The description of the conference.
    pub description: Option<String>,
    /// Topics that are discussed in this conference.
    #[serde(default)]
    pub topics: Vec<String>,
    /// The city where the conference will take place.
    pub city: Option<String>,
    /// The start date of the conference.
    pub start_date: Option<NaiveDate>,
    /// The end date of the conference.
    pub end_date: Option<NaiveDate>,
    /// The capacity of the conference.
    pub max_attendees: u32,
}

/// Field-level conference update form; every field is optional and
/// untouched fields retain their prior values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceUpdateForm {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New topic set (replaces the old one).
    pub topics: Option<Vec<String>>,
    /// New city.
    pub city: Option<String>,
    /// New start date.
    pub start_date: Option<NaiveDate>,
    /// New end date.
    pub end_date: Option<NaiveDate>,
    /// New capacity. Must not fall below seats already taken.
    pub max_attendees: Option<u32>,
}

/// Session creation form sent from the client.
///
/// The `duration` and `start_time` fields arrive as raw strings and are
/// validated against the strict `HH:MM` format when the session is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionForm {
    /// Session name. Required.
    pub name: String,
    /// What makes this session worth attending.
    pub highlights: Option<String>,
    /// Name of the speaker.
    pub speaker: String,
    /// Length of the session, `HH:MM`.
    pub duration: String,
    /// Kind of session; defaults to `NOT_SPECIFIED`.
    #[serde(default)]
    pub session_type: SessionType,
    /// Day the session takes place.
    pub date: Option<NaiveDate>,
    /// Start of the session, `HH:MM`.
    pub start_time: String,
}
