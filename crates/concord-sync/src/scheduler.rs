//! Staggered fan-out of reconciliation passes.
//!
//! One pass per registered actor, started `stagger_seconds` apart so a
//! large registry does not burst the remote API's global rate limit. Passes
//! share no mutable state; the remote actor id is the isolation boundary,
//! so no cross-actor ordering is guaranteed or needed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::actor::SyncedActor;
use crate::driver::{SyncOutcome, SyncService};

/// Result of one actor's pass within a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub actor_id: u32,
    pub outcome: SyncOutcome,
}

/// Owns the registry of synced actors and runs rounds over it.
pub struct SyncScheduler {
    service: Arc<SyncService>,
    actors: Vec<SyncedActor>,
}

impl SyncScheduler {
    #[must_use]
    pub const fn new(service: Arc<SyncService>) -> Self {
        Self {
            service,
            actors: Vec::new(),
        }
    }

    pub fn register(&mut self, actor: SyncedActor) {
        self.actors.push(actor);
    }

    #[must_use]
    pub fn actors(&self) -> &[SyncedActor] {
        &self.actors
    }

    /// Run one round: a staggered, parallel pass for every registered actor
    /// whose last success is older than the staleness window.
    ///
    /// Actors whose outcome deregisters them are dropped from the registry.
    /// There is no in-flight cancellation; a pass that outlives the window
    /// simply lets the next round re-evaluate freshness.
    pub async fn run_round(&mut self) -> Vec<PassReport> {
        let staleness = chrono::Duration::minutes(
            i64::try_from(self.service.settings().staleness_minutes).unwrap_or(i64::MAX),
        );
        let stagger = Duration::from_secs(self.service.settings().stagger_seconds);
        let now = Utc::now();

        let mut kept = Vec::new();
        let mut join_set: JoinSet<(SyncedActor, SyncOutcome)> = JoinSet::new();
        let mut started: u32 = 0;
        for mut actor in self.actors.drain(..) {
            if actor.is_sync_fresh(staleness, now) {
                info!(actor = %actor.name, "sync still fresh, skipping");
                kept.push(actor);
                continue;
            }
            let service = Arc::clone(&self.service);
            let delay = stagger * started;
            started += 1;
            join_set.spawn(async move {
                tokio::time::sleep(delay).await;
                let outcome = service.run_pass(&mut actor).await;
                (actor, outcome)
            });
        }

        let mut reports = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((actor, outcome)) => {
                    if outcome.deregisters() {
                        info!(actor = %actor.name, ?outcome, "actor deregistered");
                    } else {
                        kept.push(actor.clone());
                    }
                    reports.push(PassReport {
                        actor_id: actor.actor_id,
                        outcome,
                    });
                }
                Err(err) => warn!(%err, "sync pass task panicked"),
            }
        }

        kept.sort_by_key(|actor| actor.actor_id);
        reports.sort_by_key(|report| report.actor_id);
        self.actors = kept;
        reports
    }
}
