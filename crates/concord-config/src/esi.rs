//! ESI endpoint configuration.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "https://esi.evetech.net/latest".to_owned()
}

fn default_user_agent() -> String {
    "concord/0.1".to_owned()
}

const fn default_timeout_seconds() -> u64 {
    30
}

/// ESI hard limit: ids per add/update call.
const fn default_max_write_batch() -> usize {
    100
}

/// ESI hard limit: ids per delete call.
const fn default_max_delete_batch() -> usize {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EsiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout for the HTTP client.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Maximum contact ids per add/update call. Remote-imposed; only tests
    /// have a reason to change it.
    #[serde(default = "default_max_write_batch")]
    pub max_write_batch: usize,

    /// Maximum contact ids per delete call. Remote-imposed; only tests have
    /// a reason to change it.
    #[serde(default = "default_max_delete_batch")]
    pub max_delete_batch: usize,
}

impl Default for EsiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout_seconds(),
            max_write_batch: default_max_write_batch(),
            max_delete_batch: default_max_delete_batch(),
        }
    }
}
