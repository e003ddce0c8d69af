//! Sync driver configuration.

use serde::{Deserialize, Serialize};

/// Default name of the managed in-game label.
fn default_label_name() -> String {
    "STANDINGS".to_owned()
}

/// Default staleness window in minutes.
const fn default_staleness_minutes() -> u64 {
    30
}

/// Default delay between actor pass starts, in seconds.
const fn default_stagger_seconds() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    /// Name of the in-game label that marks contacts managed by Concord.
    /// Matched case-insensitively; synced characters must create it
    /// themselves.
    #[serde(default = "default_label_name")]
    pub managed_label_name: String,

    /// A pass whose last success is older than this is due for a re-run.
    #[serde(default = "default_staleness_minutes")]
    pub staleness_minutes: u64,

    /// Delay between consecutive actor pass starts, to avoid bursting the
    /// remote API's global rate limit.
    #[serde(default = "default_stagger_seconds")]
    pub stagger_seconds: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            managed_label_name: default_label_name(),
            staleness_minutes: default_staleness_minutes(),
            stagger_seconds: default_stagger_seconds(),
        }
    }
}
