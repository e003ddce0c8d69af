//! The gateway seam between the reconciliation driver and ESI.
//!
//! The driver only ever depends on [`ContactsGateway`]; the production
//! implementation is [`crate::EsiClient`], tests use in-memory fakes.

use async_trait::async_trait;

use concord_core::{Contact, ContactRecord, LabelRecord};

use crate::error::EsiError;

/// Access credential for one remote actor.
///
/// The token must carry both contacts scopes; obtaining and refreshing it is
/// the credential store's concern, not the gateway's.
#[derive(Debug, Clone)]
pub struct Credential {
    pub character_id: u32,
    pub character_name: String,
    pub access_token: String,
}

/// Remote operations on one actor's contact list.
#[async_trait]
pub trait ContactsGateway: Send + Sync {
    /// Fetch all current contacts for the actor.
    async fn fetch_contacts(&self, credential: &Credential) -> Result<Vec<ContactRecord>, EsiError>;

    /// Fetch all contact labels for the actor.
    async fn fetch_labels(&self, credential: &Credential) -> Result<Vec<LabelRecord>, EsiError>;

    /// Delete contacts by id.
    async fn delete_contacts(
        &self,
        credential: &Credential,
        contact_ids: &[u32],
    ) -> Result<(), EsiError>;

    /// Create contacts, grouped and batched per the remote write limits.
    async fn add_contacts(
        &self,
        credential: &Credential,
        contacts: &[Contact],
    ) -> Result<(), EsiError>;

    /// Update existing contacts, grouped and batched per the remote write
    /// limits.
    async fn update_contacts(
        &self,
        credential: &Credential,
        contacts: &[Contact],
    ) -> Result<(), EsiError>;
}
