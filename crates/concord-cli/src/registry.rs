//! File-backed actor registry and standings source.
//!
//! The registry file is a TOML document listing the synced actors (with
//! their access tokens) and the approved standings rows. It stands in for
//! the database-backed registry and approval workflow of a full deployment;
//! the driver only sees the collaborator traits.
//!
//! ```toml
//! [[actors]]
//! actor_id = 95000001
//! name = "Bruce Wayne"
//! owner = "bruce"
//! access_token = "..."
//!
//! [[standings]]
//! entity_id = 2001
//! category = "corporation"
//! standing = 9.9
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use concord_core::EntityCategory;
use concord_esi::Credential;
use concord_sync::{
    Authorization, CredentialIssue, CredentialStore, Notifier, StandingRow, StandingsSource,
    SyncedActor,
};

#[derive(Debug, Deserialize)]
struct ActorEntry {
    actor_id: u32,
    name: String,
    owner: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StandingEntry {
    entity_id: u32,
    category: EntityCategory,
    standing: f64,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    actors: Vec<ActorEntry>,
    #[serde(default)]
    standings: Vec<StandingEntry>,
}

/// Parsed registry: actors to sync plus the standings source of truth.
pub struct FileRegistry {
    actors: Vec<ActorEntry>,
    standings: Vec<StandingRow>,
    tokens: HashMap<u32, String>,
}

impl FileRegistry {
    /// Load and parse the registry file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read registry file {}", path.display()))?;
        let file: RegistryFile = toml::from_str(&raw)
            .with_context(|| format!("failed to parse registry file {}", path.display()))?;

        let tokens = file
            .actors
            .iter()
            .filter_map(|a| a.access_token.clone().map(|t| (a.actor_id, t)))
            .collect();
        let standings = file
            .standings
            .iter()
            .map(|s| StandingRow {
                entity_id: s.entity_id,
                category: s.category,
                standing: s.standing,
            })
            .collect();
        Ok(Self {
            actors: file.actors,
            standings,
            tokens,
        })
    }

    /// Fresh actor records for every entry in the file.
    #[must_use]
    pub fn actors(&self) -> Vec<SyncedActor> {
        self.actors
            .iter()
            .map(|a| SyncedActor::new(a.actor_id, a.name.clone(), a.owner.clone()))
            .collect()
    }
}

impl Authorization for FileRegistry {
    /// Listing an actor in the registry file is the eligibility grant here.
    fn is_eligible(&self, actor_id: u32) -> bool {
        self.actors.iter().any(|a| a.actor_id == actor_id)
    }
}

#[async_trait]
impl CredentialStore for FileRegistry {
    async fn fetch_credential(
        &self,
        actor_id: u32,
        _scopes: &[&str],
    ) -> Result<Credential, CredentialIssue> {
        let actor = self
            .actors
            .iter()
            .find(|a| a.actor_id == actor_id)
            .ok_or(CredentialIssue::Missing)?;
        let token = self
            .tokens
            .get(&actor_id)
            .ok_or(CredentialIssue::Missing)?;
        Ok(Credential {
            character_id: actor_id,
            character_name: actor.name.clone(),
            access_token: token.clone(),
        })
    }
}

impl StandingsSource for FileRegistry {
    fn standings(&self) -> Vec<StandingRow> {
        self.standings.clone()
    }
}

/// Notifier that only writes to the log. A deployment with a user-facing
/// notification channel supplies its own implementation.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, user: &str, subject: &str, message: &str) -> anyhow::Result<()> {
        info!(user, subject, message, "notification");
        Ok(())
    }
}
