//! # concord-sync
//!
//! The reconciliation driver: one pass per synced actor, fetch current
//! contacts, build the desired state from the standings database, diff,
//! and push the difference through the gateway.
//!
//! Terminal states per pass: `NotEligible` and `NoCredential` deregister
//! the actor and notify the owner; `LabelMissing` records the problem but
//! keeps the registration; `UpToDate` issues no writes; `Synced` and
//! `Failed` round out the picture. See [`SyncOutcome`].

mod actor;
mod collaborators;
mod driver;
mod error;
mod scheduler;

pub use actor::SyncedActor;
pub use collaborators::{
    Authorization, CredentialIssue, CredentialStore, Notifier, REQUIRED_SCOPES, StandingRow,
    StandingsSource,
};
pub use driver::{SyncOutcome, SyncService};
pub use error::SyncError;
pub use scheduler::{PassReport, SyncScheduler};
