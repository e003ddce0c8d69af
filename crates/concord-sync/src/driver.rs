//! The per-actor reconciliation driver.
//!
//! One call to [`SyncService::run_pass`] is one full fetch, diff, write
//! cycle for one actor, ending in exactly one [`SyncOutcome`]. The driver
//! holds no per-actor state of its own; everything it remembers between
//! passes lives on the [`SyncedActor`] record.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use concord_config::SyncSettings;
use concord_core::{Contact, ContactSet};
use concord_esi::{ContactsGateway, Credential};

use crate::actor::SyncedActor;
use crate::collaborators::{
    Authorization, CredentialIssue, CredentialStore, Notifier, REQUIRED_SCOPES, StandingsSource,
};
use crate::error::SyncError;

/// Terminal state of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The actor lost the required permission; registration is removed.
    NotEligible,
    /// No usable credential; registration is removed.
    NoCredential(CredentialIssue),
    /// Current and desired state already match; no writes issued.
    UpToDate,
    /// The managed label does not exist in-game; no writes issued, the
    /// actor stays registered and can fix this themselves.
    LabelMissing,
    /// Writes issued and accepted.
    Synced,
    /// An unexpected error interrupted the pass.
    Failed(String),
}

impl SyncOutcome {
    /// Whether this outcome removes the actor's synced registration.
    #[must_use]
    pub const fn deregisters(&self) -> bool {
        matches!(self, Self::NotEligible | Self::NoCredential(_))
    }
}

/// The reconciliation driver for all actors.
///
/// Stateless across passes and cheap to share; collaborators come in as
/// trait objects so the driver can be exercised end to end with in-memory
/// fakes.
pub struct SyncService {
    gateway: Arc<dyn ContactsGateway>,
    authorization: Arc<dyn Authorization>,
    credentials: Arc<dyn CredentialStore>,
    standings: Arc<dyn StandingsSource>,
    notifier: Arc<dyn Notifier>,
    settings: SyncSettings,
}

impl SyncService {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ContactsGateway>,
        authorization: Arc<dyn Authorization>,
        credentials: Arc<dyn CredentialStore>,
        standings: Arc<dyn StandingsSource>,
        notifier: Arc<dyn Notifier>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            gateway,
            authorization,
            credentials,
            standings,
            notifier,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Run one reconciliation pass for `actor`.
    ///
    /// Always returns a terminal outcome; errors inside the pass become
    /// [`SyncOutcome::Failed`] with the message recorded on the actor. When
    /// the outcome [`SyncOutcome::deregisters`], the caller must drop the
    /// actor's registration; the owner has already been notified.
    pub async fn run_pass(&self, actor: &mut SyncedActor) -> SyncOutcome {
        if !self.authorization.is_eligible(actor.actor_id) {
            info!(actor = %actor.name, "sync deactivated due to insufficient permissions");
            self.send_deactivation_notice(actor, "you no longer have permission for this service");
            return SyncOutcome::NotEligible;
        }

        let credential = match self
            .credentials
            .fetch_credential(actor.actor_id, REQUIRED_SCOPES)
            .await
        {
            Ok(credential) => credential,
            Err(issue) => {
                info!(actor = %actor.name, ?issue, "sync deactivated due to credential issue");
                self.send_deactivation_notice(actor, issue.reason());
                return SyncOutcome::NoCredential(issue);
            }
        };

        match self.sync_contacts(actor, &credential).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let message = format!("Sync failed: {err}");
                error!(actor = %actor.name, %err, "sync pass failed");
                actor.record_error(message.as_str());
                SyncOutcome::Failed(message)
            }
        }
    }

    /// The fetch, diff, write core of a pass.
    async fn sync_contacts(
        &self,
        actor: &mut SyncedActor,
        credential: &Credential,
    ) -> Result<SyncOutcome, SyncError> {
        let contact_records = self.gateway.fetch_contacts(credential).await?;
        let label_records = self.gateway.fetch_labels(credential).await?;
        let current = ContactSet::from_records(&contact_records, &label_records)?;
        debug!(actor = %actor.name, count = current.len(), "fetched current contacts");

        let label_name = &self.settings.managed_label_name;
        let Some(label_id) = current.label_by_name(label_name).map(|l| l.id()) else {
            actor.has_label = false;
            let message = format!("Label '{label_name}' not found. Please create it in-game.");
            warn!(actor = %actor.name, "{message}");
            actor.record_error(message);
            return Ok(SyncOutcome::LabelMissing);
        };
        actor.has_label = true;

        let desired = self.build_desired_contacts(actor, &current, label_id)?;
        let diff = current.difference(&desired);
        if diff.is_empty() {
            info!(actor = %actor.name, "contacts already up to date");
            actor.record_success(desired.version_hash(), Utc::now());
            return Ok(SyncOutcome::UpToDate);
        }

        // Deletes first so the per-actor contact ceiling can never be
        // exceeded mid-pass.
        if !diff.removed.is_empty() {
            let ids: Vec<u32> = diff.removed.iter().map(Contact::contact_id).collect();
            self.gateway.delete_contacts(credential, &ids).await?;
        }
        if !diff.added.is_empty() {
            self.gateway.add_contacts(credential, &diff.added).await?;
        }
        if !diff.changed.is_empty() {
            self.gateway
                .update_contacts(credential, &diff.changed)
                .await?;
        }

        info!(
            actor = %actor.name,
            added = diff.added.len(),
            removed = diff.removed.len(),
            changed = diff.changed.len(),
            "contacts update completed"
        );
        actor.record_success(desired.version_hash(), Utc::now());
        Ok(SyncOutcome::Synced)
    }

    /// Build the desired snapshot from the standings database.
    ///
    /// Starts from a clone of the current snapshot (keeping labels and any
    /// contacts the actor manages by hand), strips every contact tagged with
    /// the managed label, then rebuilds those from the standings rows. Rows
    /// that fail validation are logged and skipped.
    fn build_desired_contacts(
        &self,
        actor: &SyncedActor,
        current: &ContactSet,
        label_id: u64,
    ) -> Result<ContactSet, SyncError> {
        let mut desired = current.clone();

        let managed: Vec<u32> = desired
            .contacts()
            .filter(|contact| contact.has_label(label_id))
            .map(Contact::contact_id)
            .collect();
        desired.remove_contacts(managed)?;

        for row in self.standings.standings() {
            match Contact::new(row.entity_id, row.category, row.standing, [label_id]) {
                Ok(contact) => desired.add_contact(contact)?,
                Err(err) => {
                    warn!(
                        actor = %actor.name,
                        entity_id = row.entity_id,
                        %err,
                        "skipping invalid standings row"
                    );
                }
            }
        }
        Ok(desired)
    }

    /// Tell the owner their character was deregistered, and why. Delivery
    /// failures are logged only.
    fn send_deactivation_notice(&self, actor: &SyncedActor, reason: &str) {
        let subject = format!("Contact sync deactivated for {}", actor.name);
        let message = format!(
            "Contact sync has been deactivated for your character {}, \
             because {reason}.\n\
             Feel free to activate sync for your character again, \
             once the issue has been resolved.",
            actor.name
        );
        if let Err(err) = self.notifier.notify(&actor.owner, &subject, &message) {
            warn!(actor = %actor.name, %err, "failed to deliver deactivation notice");
        }
    }
}
