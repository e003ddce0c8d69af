//! Boundary collaborator contracts.
//!
//! The driver consumes these as trait objects; the surrounding application
//! (permission system, token storage, standings database, notification
//! service) provides the implementations.

use async_trait::async_trait;

use concord_core::EntityCategory;
use concord_esi::Credential;

/// ESI scopes a credential must carry to read and write contacts.
pub const REQUIRED_SCOPES: &[&str] = &[
    "esi-characters.read_contacts.v1",
    "esi-characters.write_contacts.v1",
];

/// Why no usable credential could be produced for an actor.
///
/// The three cases exist so users get distinct messages; the driver treats
/// them identically otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialIssue {
    Missing,
    Invalid,
    Expired,
}

impl CredentialIssue {
    /// Reason text inserted into the deactivation notice.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Missing => "you do not have a token anymore",
            Self::Invalid => "your token is no longer valid",
            Self::Expired => "your token has expired",
        }
    }
}

/// Whether an actor still holds the permission required to be synced.
pub trait Authorization: Send + Sync {
    fn is_eligible(&self, actor_id: u32) -> bool;
}

/// Produces a valid access credential carrying the required scopes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a valid credential for the actor.
    ///
    /// # Errors
    ///
    /// Returns the applicable [`CredentialIssue`] when no usable credential
    /// exists; the driver turns this into a `NoCredential` outcome.
    async fn fetch_credential(
        &self,
        actor_id: u32,
        scopes: &[&str],
    ) -> Result<Credential, CredentialIssue>;
}

/// One approved row of the standings database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandingRow {
    pub entity_id: u32,
    pub category: EntityCategory,
    pub standing: f64,
}

/// Read-only view of the approval-gated standings database.
pub trait StandingsSource: Send + Sync {
    /// All approved standings, as of now. Rows that fail contact validation
    /// are skipped by the driver, not here.
    fn standings(&self) -> Vec<StandingRow>;
}

/// Delivers a message to a user. Fire-and-forget: a delivery failure is
/// logged by the driver and never aborts a pass.
pub trait Notifier: Send + Sync {
    /// Send `message` to `user`.
    ///
    /// # Errors
    ///
    /// Implementations may fail; the driver only logs the error.
    fn notify(&self, user: &str, subject: &str, message: &str) -> anyhow::Result<()>;
}
