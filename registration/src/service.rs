//! The registration service: cross-entity operations under one atomic
//! commit each.
//!
//! Every mutating operation here is a transaction body: read the records it
//! touches at their current versions, apply the domain checks, and commit
//! all resulting writes as one compare-and-set batch. Losing an optimistic
//! race re-runs the whole body against fresh state (bounded by the
//! [`RetryPolicy`]); domain rejections fail immediately. A failed operation
//! never leaves partial state behind — paired profile/conference and
//! profile/session mutations land together or not at all.
//!
//! This is what prevents the "last seat" double-booking: of two concurrent
//! registrations against one remaining seat, one commit wins; the other
//! fails its version check, re-reads, sees zero seats, and is rejected with
//! a seat-exhaustion conflict.

use crate::error::RegistrationError;
use crate::notify::NotificationSink;
use crate::stores::{ConferenceStore, ProfileStore, SessionStore};
use crate::types::{
    ClockTime, Conference, ConferenceForm, ConferenceId, ConferenceUpdateForm, Identity, Profile,
    ProfileForm, Session, SessionForm, SessionId,
};
use conference_central_core::{
    Clock, RecordStore, RetryPolicy, StoreError, Version, retry_with_predicate,
};
use std::fmt;
use std::sync::Arc;

/// Outcome of one transaction attempt.
///
/// Contention (a lost optimistic race) is retryable; everything else aborts
/// the operation immediately.
#[derive(Debug)]
enum TxnError {
    Abort(RegistrationError),
    Contention(StoreError),
}

impl TxnError {
    const fn is_contention(&self) -> bool {
        matches!(self, Self::Contention(_))
    }
}

impl fmt::Display for TxnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort(err) => write!(f, "{err}"),
            Self::Contention(err) => write!(f, "{err}"),
        }
    }
}

impl From<StoreError> for TxnError {
    fn from(err: StoreError) -> Self {
        if err.is_conflict() {
            Self::Contention(err)
        } else {
            Self::Abort(err.into())
        }
    }
}

impl From<RegistrationError> for TxnError {
    fn from(err: RegistrationError) -> Self {
        Self::Abort(err)
    }
}

fn finalize<T>(outcome: Result<T, TxnError>) -> Result<T, RegistrationError> {
    match outcome {
        Ok(value) => Ok(value),
        Err(TxnError::Abort(err)) => Err(err),
        // Retries exhausted: surface the contention as a conflict.
        Err(TxnError::Contention(err)) => Err(err.into()),
    }
}

/// Coordinates registrations, wishlists and conference/session lifecycle
/// across the typed stores.
///
/// Construct once and pass by reference; all dependencies are explicit.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use conference_central_core::SystemClock;
/// use conference_central_memory::InMemoryStore;
/// use conference_central_registration::RegistrationService;
///
/// let service = RegistrationService::new(Arc::new(InMemoryStore::new()), Arc::new(SystemClock));
/// ```
#[derive(Clone)]
pub struct RegistrationService {
    backend: Arc<dyn RecordStore>,
    profiles: ProfileStore,
    conferences: ConferenceStore,
    sessions: SessionStore,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    notifier: Option<Arc<dyn NotificationSink>>,
}

impl RegistrationService {
    /// Create a service over the given backend and clock, with the default
    /// retry policy and no notification sink.
    #[must_use]
    pub fn new(backend: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            profiles: ProfileStore::new(Arc::clone(&backend)),
            conferences: ConferenceStore::new(Arc::clone(&backend)),
            sessions: SessionStore::new(Arc::clone(&backend)),
            backend,
            clock,
            retry: RetryPolicy::default(),
            notifier: None,
        }
    }

    /// Replace the transaction retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Attach a sink for post-commit conference-creation notifications.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// The profile repository this service writes through.
    #[must_use]
    pub const fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// The conference repository this service writes through.
    #[must_use]
    pub const fn conferences(&self) -> &ConferenceStore {
        &self.conferences
    }

    /// The session repository this service writes through.
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register the caller for a conference.
    ///
    /// Atomically adds the conference to the caller's attending set
    /// (lazily creating the profile) and takes one seat.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::NotFound`] if the conference does not exist
    /// - [`RegistrationError::Conflict`] if the caller is already
    ///   registered, the conference is sold out, or contention survived
    ///   all retries
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id, conference_id = %conference_id))]
    pub async fn register_for_conference(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
    ) -> Result<(), RegistrationError> {
        let outcome = retry_with_predicate(
            self.retry.clone(),
            || {
                let this = self.clone();
                let identity = identity.clone();
                async move { this.try_register(&identity, conference_id).await }
            },
            TxnError::is_contention,
        )
        .await;

        if outcome.is_ok() {
            tracing::info!("Registered for conference");
        }
        finalize(outcome)
    }

    async fn try_register(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
    ) -> Result<(), TxnError> {
        let (mut conference, conference_version) = self
            .conferences
            .get(conference_id)
            .await?
            .ok_or_else(|| RegistrationError::not_found("conference", conference_id))?;
        let (mut profile, profile_version) = self.profile_or_default(identity).await?;

        if profile.is_attending(conference_id) {
            return Err(RegistrationError::Conflict(format!(
                "already registered for conference {conference_id}"
            ))
            .into());
        }
        if !conference.take_seat() {
            return Err(RegistrationError::Conflict(format!(
                "no seats available for conference {conference_id}"
            ))
            .into());
        }
        profile.conferences_attending.insert(conference_id);

        self.backend
            .commit(vec![
                ProfileStore::write(&profile, profile_version)?,
                ConferenceStore::write(&conference, conference_version)?,
            ])
            .await?;
        Ok(())
    }

    /// Remove the caller's registration for a conference.
    ///
    /// Atomically drops the attending-set membership and returns one seat,
    /// capped at the conference capacity.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::NotFound`] if the conference does not exist
    /// - [`RegistrationError::Conflict`] if the caller is not registered,
    ///   or contention survived all retries
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id, conference_id = %conference_id))]
    pub async fn unregister_from_conference(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
    ) -> Result<(), RegistrationError> {
        let outcome = retry_with_predicate(
            self.retry.clone(),
            || {
                let this = self.clone();
                let identity = identity.clone();
                async move { this.try_unregister(&identity, conference_id).await }
            },
            TxnError::is_contention,
        )
        .await;

        if outcome.is_ok() {
            tracing::info!("Unregistered from conference");
        }
        finalize(outcome)
    }

    async fn try_unregister(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
    ) -> Result<(), TxnError> {
        let (mut conference, conference_version) = self
            .conferences
            .get(conference_id)
            .await?
            .ok_or_else(|| RegistrationError::not_found("conference", conference_id))?;
        let (mut profile, profile_version) = self.profile_or_default(identity).await?;

        if !profile.conferences_attending.remove(&conference_id) {
            return Err(RegistrationError::Conflict(format!(
                "not registered for conference {conference_id}"
            ))
            .into());
        }
        conference.release_seat();

        self.backend
            .commit(vec![
                ProfileStore::write(&profile, profile_version)?,
                ConferenceStore::write(&conference, conference_version)?,
            ])
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Wishlist
    // ------------------------------------------------------------------

    /// Save a session to the caller's wishlist.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::NotFound`] if the session does not exist
    /// - [`RegistrationError::Conflict`] if the session is already
    ///   wishlisted, or contention survived all retries
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id, session_id = %session_id))]
    pub async fn add_session_to_wishlist(
        &self,
        identity: &Identity,
        session_id: SessionId,
    ) -> Result<(), RegistrationError> {
        let outcome = retry_with_predicate(
            self.retry.clone(),
            || {
                let this = self.clone();
                let identity = identity.clone();
                async move { this.try_add_to_wishlist(&identity, session_id).await }
            },
            TxnError::is_contention,
        )
        .await;
        finalize(outcome)
    }

    async fn try_add_to_wishlist(
        &self,
        identity: &Identity,
        session_id: SessionId,
    ) -> Result<(), TxnError> {
        if self.sessions.get(session_id).await?.is_none() {
            return Err(RegistrationError::not_found("session", session_id).into());
        }
        let (mut profile, profile_version) = self.profile_or_default(identity).await?;

        if !profile.session_wishlist.insert(session_id) {
            return Err(RegistrationError::Conflict(format!(
                "session {session_id} is already in the wishlist"
            ))
            .into());
        }

        self.backend
            .commit(vec![ProfileStore::write(&profile, profile_version)?])
            .await?;
        Ok(())
    }

    /// Drop a session from the caller's wishlist.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Conflict`] if the session is not on the
    ///   wishlist, or contention survived all retries
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id, session_id = %session_id))]
    pub async fn remove_session_from_wishlist(
        &self,
        identity: &Identity,
        session_id: SessionId,
    ) -> Result<(), RegistrationError> {
        let outcome = retry_with_predicate(
            self.retry.clone(),
            || {
                let this = self.clone();
                let identity = identity.clone();
                async move { this.try_remove_from_wishlist(&identity, session_id).await }
            },
            TxnError::is_contention,
        )
        .await;
        finalize(outcome)
    }

    async fn try_remove_from_wishlist(
        &self,
        identity: &Identity,
        session_id: SessionId,
    ) -> Result<(), TxnError> {
        let (mut profile, profile_version) = self.profile_or_default(identity).await?;

        if !profile.session_wishlist.remove(&session_id) {
            return Err(RegistrationError::Conflict(format!(
                "session {session_id} is not in the wishlist"
            ))
            .into());
        }

        self.backend
            .commit(vec![ProfileStore::write(&profile, profile_version)?])
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Conference lifecycle
    // ------------------------------------------------------------------

    /// Create a conference organized by the caller.
    ///
    /// All seats start available, and the caller's profile is created
    /// alongside if absent — both writes commit together. Once the commit
    /// has succeeded the confirmation notification (if a sink is attached)
    /// is dispatched fire-and-forget.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::InvalidArgument`] if the name is empty
    /// - [`RegistrationError::Conflict`] if contention survived all retries
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
    pub async fn create_conference(
        &self,
        identity: &Identity,
        form: ConferenceForm,
    ) -> Result<Conference, RegistrationError> {
        if form.name.is_empty() {
            return Err(RegistrationError::InvalidArgument(
                "The name is required".to_string(),
            ));
        }

        // The id stays stable across retry attempts.
        let conference_id = ConferenceId::new();
        let outcome = retry_with_predicate(
            self.retry.clone(),
            || {
                let this = self.clone();
                let identity = identity.clone();
                let form = form.clone();
                async move { this.try_create_conference(&identity, conference_id, form).await }
            },
            TxnError::is_contention,
        )
        .await;
        let conference = finalize(outcome)?;

        tracing::info!(conference_id = %conference.id, "Created conference");
        self.dispatch_creation_notice(identity, &conference).await;
        Ok(conference)
    }

    async fn try_create_conference(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
        form: ConferenceForm,
    ) -> Result<Conference, TxnError> {
        let (profile, profile_version) = self.profile_or_default(identity).await?;
        let conference =
            Conference::from_form(conference_id, &identity.user_id, form, self.clock.now());

        self.backend
            .commit(vec![
                ConferenceStore::write(&conference, Version::INITIAL)?,
                ProfileStore::write(&profile, profile_version)?,
            ])
            .await?;
        Ok(conference)
    }

    async fn dispatch_creation_notice(&self, identity: &Identity, conference: &Conference) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(err) = notifier
            .conference_created(identity.clone(), conference.clone())
            .await
        {
            // Fire-and-forget: the conference is already durable.
            tracing::warn!(error = %err, conference_id = %conference.id, "Confirmation dispatch failed");
        }
    }

    /// Update conference fields; untouched fields retain prior values.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::NotFound`] if the conference does not exist
    /// - [`RegistrationError::Forbidden`] if the caller is not the
    ///   organizer
    /// - [`RegistrationError::InvalidArgument`] if the update is invalid
    ///   (empty name, capacity below seats taken)
    /// - [`RegistrationError::Conflict`] if contention survived all retries
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id, conference_id = %conference_id))]
    pub async fn update_conference(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
        form: ConferenceUpdateForm,
    ) -> Result<Conference, RegistrationError> {
        let outcome = retry_with_predicate(
            self.retry.clone(),
            || {
                let this = self.clone();
                let identity = identity.clone();
                let form = form.clone();
                async move { this.try_update_conference(&identity, conference_id, form).await }
            },
            TxnError::is_contention,
        )
        .await;
        finalize(outcome)
    }

    async fn try_update_conference(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
        form: ConferenceUpdateForm,
    ) -> Result<Conference, TxnError> {
        let (mut conference, conference_version) = self
            .conferences
            .get(conference_id)
            .await?
            .ok_or_else(|| RegistrationError::not_found("conference", conference_id))?;

        if !conference.is_organized_by(&identity.user_id) {
            return Err(RegistrationError::Forbidden(
                "only the organizer can update the conference".to_string(),
            )
            .into());
        }
        conference.apply_update(form)?;

        self.backend
            .commit(vec![ConferenceStore::write(&conference, conference_version)?])
            .await?;
        Ok(conference)
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Create a session under a conference the caller organizes.
    ///
    /// Persists the session and appends its id to the conference's session
    /// back-reference list in one commit.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::NotFound`] if the conference does not exist
    /// - [`RegistrationError::Forbidden`] if the caller is not the
    ///   organizer
    /// - [`RegistrationError::InvalidArgument`] if the name is empty or
    ///   `duration`/`start_time` fail the `HH:MM` format check
    /// - [`RegistrationError::Conflict`] if contention survived all retries
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id, conference_id = %conference_id))]
    pub async fn create_session(
        &self,
        identity: &Identity,
        conference_id: ConferenceId,
        form: SessionForm,
    ) -> Result<Session, RegistrationError> {
        if form.name.is_empty() {
            return Err(RegistrationError::InvalidArgument(
                "The name is required".to_string(),
            ));
        }
        let duration: ClockTime = form.duration.parse().map_err(|_| {
            RegistrationError::InvalidArgument(format!(
                "Invalid duration time format: {}",
                form.duration
            ))
        })?;
        let start_time: ClockTime = form.start_time.parse().map_err(|_| {
            RegistrationError::InvalidArgument(format!(
                "Invalid start time format: {}",
                form.start_time
            ))
        })?;

        let session = Session {
            id: SessionId::new(),
            conference_id,
            name: form.name,
            highlights: form.highlights,
            speaker: form.speaker,
            duration,
            session_type: form.session_type,
            date: form.date,
            start_time,
        };

        let outcome = retry_with_predicate(
            self.retry.clone(),
            || {
                let this = self.clone();
                let identity = identity.clone();
                let session = session.clone();
                async move { this.try_create_session(&identity, session).await }
            },
            TxnError::is_contention,
        )
        .await;
        let session = finalize(outcome)?;

        tracing::info!(session_id = %session.id, "Created session");
        Ok(session)
    }

    async fn try_create_session(
        &self,
        identity: &Identity,
        session: Session,
    ) -> Result<Session, TxnError> {
        let (mut conference, conference_version) = self
            .conferences
            .get(session.conference_id)
            .await?
            .ok_or_else(|| RegistrationError::not_found("conference", session.conference_id))?;

        if !conference.is_organized_by(&identity.user_id) {
            return Err(RegistrationError::Forbidden(
                "only the organizer can add sessions to the conference".to_string(),
            )
            .into());
        }
        conference.session_ids.push(session.id);

        self.backend
            .commit(vec![
                SessionStore::write(&session, Version::INITIAL)?,
                ConferenceStore::write(&conference, conference_version)?,
            ])
            .await?;
        Ok(session)
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    /// Create or update the caller's profile from a profile form.
    ///
    /// Fields absent from the form keep their current values; a brand-new
    /// profile starts from the defaults (display name derived from the
    /// e-mail local part).
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Conflict`] if contention survived all retries
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
    pub async fn save_profile(
        &self,
        identity: &Identity,
        form: ProfileForm,
    ) -> Result<Profile, RegistrationError> {
        let outcome = retry_with_predicate(
            self.retry.clone(),
            || {
                let this = self.clone();
                let identity = identity.clone();
                let form = form.clone();
                async move { this.try_save_profile(&identity, form).await }
            },
            TxnError::is_contention,
        )
        .await;
        finalize(outcome)
    }

    async fn try_save_profile(
        &self,
        identity: &Identity,
        form: ProfileForm,
    ) -> Result<Profile, TxnError> {
        let (mut profile, profile_version) = self.profile_or_default(identity).await?;

        if let Some(display_name) = form.display_name {
            profile.display_name = display_name;
        }
        if let Some(tee_shirt_size) = form.tee_shirt_size {
            profile.tee_shirt_size = tee_shirt_size;
        }

        self.backend
            .commit(vec![ProfileStore::write(&profile, profile_version)?])
            .await?;
        Ok(profile)
    }

    /// Fetch the caller's profile, creating the default one on first
    /// touch.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Conflict`] if contention survived all retries
    #[tracing::instrument(skip_all, fields(user_id = %identity.user_id))]
    pub async fn get_profile(&self, identity: &Identity) -> Result<Profile, RegistrationError> {
        let outcome = retry_with_predicate(
            self.retry.clone(),
            || {
                let this = self.clone();
                let identity = identity.clone();
                async move { this.try_get_profile(&identity).await }
            },
            TxnError::is_contention,
        )
        .await;
        finalize(outcome)
    }

    async fn try_get_profile(&self, identity: &Identity) -> Result<Profile, TxnError> {
        if let Some((profile, _)) = self.profiles.get(&identity.user_id).await? {
            return Ok(profile);
        }

        let profile = Profile::default_for(identity);
        self.backend
            .commit(vec![ProfileStore::write(&profile, Version::INITIAL)?])
            .await?;
        Ok(profile)
    }

    // ------------------------------------------------------------------
    // Read-throughs
    // ------------------------------------------------------------------

    /// Fetch a conference by id.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::NotFound`] if the conference does not exist
    pub async fn get_conference(
        &self,
        conference_id: ConferenceId,
    ) -> Result<Conference, RegistrationError> {
        let (conference, _) = self
            .conferences
            .get(conference_id)
            .await
            .map_err(RegistrationError::from)?
            .ok_or_else(|| RegistrationError::not_found("conference", conference_id))?;
        Ok(conference)
    }

    /// Fetch a session by id.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::NotFound`] if the session does not exist
    pub async fn get_session(&self, session_id: SessionId) -> Result<Session, RegistrationError> {
        let (session, _) = self
            .sessions
            .get(session_id)
            .await
            .map_err(RegistrationError::from)?
            .ok_or_else(|| RegistrationError::not_found("session", session_id))?;
        Ok(session)
    }

    async fn profile_or_default(
        &self,
        identity: &Identity,
    ) -> Result<(Profile, Version), StoreError> {
        Ok(self
            .profiles
            .get(&identity.user_id)
            .await?
            .unwrap_or_else(|| (Profile::default_for(identity), Version::INITIAL)))
    }
}
