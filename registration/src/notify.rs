//! Notification dispatch seam.
//!
//! In the original deployment, conference creation enqueued a confirmation
//! e-mail on a task queue. The service's contract is only ordering:
//! creation must have committed durably before dispatch is triggered, and
//! dispatch is at-least-once, fire-and-forget — a failing sink is logged
//! and never surfaces to the caller.

use crate::types::{Conference, Identity};
use conference_central_core::StoreFuture;
use std::sync::RwLock;

/// Downstream consumer of "conference created" notifications.
///
/// Implementations might enqueue an e-mail, post to a message bus, or — in
/// tests — just record the call.
pub trait NotificationSink: Send + Sync {
    /// Called after a conference creation commit has succeeded.
    ///
    /// # Errors
    ///
    /// Sink failures are reported so the service can log them; they are
    /// never propagated to the creating caller.
    fn conference_created(&self, organizer: Identity, conference: Conference)
    -> StoreFuture<'_, ()>;
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn conference_created(
        &self,
        _organizer: Identity,
        _conference: Conference,
    ) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// Sink that records every notification, for asserting dispatch order in
/// tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RwLock<Vec<(Identity, Conference)>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications captured so far, in dispatch order.
    ///
    /// # Panics
    ///
    /// Panics if the inner lock is poisoned.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn sent(&self) -> Vec<(Identity, Conference)> {
        self.sent.read().expect("notifier lock poisoned").clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn conference_created(
        &self,
        organizer: Identity,
        conference: Conference,
    ) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            #[allow(clippy::expect_used)]
            self.sent
                .write()
                .expect("notifier lock poisoned")
                .push((organizer, conference));
            Ok(())
        })
    }
}
