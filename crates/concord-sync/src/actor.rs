//! The synced actor record.

use chrono::{DateTime, Duration, Utc};

/// One remote character registered for contact synchronization.
///
/// Carries only what the driver needs between passes: bookkeeping for
/// freshness, the most recent terminal outcome's message, and the
/// fingerprint of the last pushed contact state. No history is kept; every
/// pass overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedActor {
    /// Remote character id; the isolation boundary between passes.
    pub actor_id: u32,
    /// Display name of the synced character.
    pub name: String,
    /// Owning user, the recipient of deactivation notices.
    pub owner: String,
    /// Whether the managed label existed in-game at the last pass.
    pub has_label: bool,
    /// Completion time of the last successful pass.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Message of the most recent terminal outcome; empty after success.
    pub last_error: String,
    /// Content fingerprint of the contact state last pushed or confirmed.
    pub last_fingerprint: String,
}

impl SyncedActor {
    #[must_use]
    pub fn new(actor_id: u32, name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            actor_id,
            name: name.into(),
            owner: owner.into(),
            has_label: false,
            last_sync_at: None,
            last_error: String::new(),
            last_fingerprint: String::new(),
        }
    }

    /// Whether the last successful sync is younger than the staleness
    /// window. A fresh actor is skipped by the scheduler; a never-synced
    /// actor is always stale.
    #[must_use]
    pub fn is_sync_fresh(&self, staleness: Duration, now: DateTime<Utc>) -> bool {
        self.last_sync_at
            .is_some_and(|last| last > now - staleness)
    }

    /// Record a successful pass.
    pub fn record_success(&mut self, fingerprint: String, now: DateTime<Utc>) {
        self.last_sync_at = Some(now);
        self.last_error.clear();
        self.last_fingerprint = fingerprint;
    }

    /// Record a terminal failure message, overwriting the previous one.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = message.into();
    }
}
