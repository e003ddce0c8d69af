//! # concord-config
//!
//! Layered configuration loading for Concord using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CONCORD_*` prefix, `__` as separator)
//! 2. Project-level `.concord/config.toml`
//! 3. User-level `~/.config/concord/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CONCORD_SYNC__MANAGED_LABEL_NAME` -> `sync.managed_label_name`,
//! `CONCORD_RETRY__MAX_ATTEMPTS` -> `retry.max_attempts`, etc. The `__`
//! (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use concord_config::ConcordConfig;
//!
//! // Load from all sources (dotenvy + TOML + env):
//! let config = ConcordConfig::load_with_dotenv().expect("config");
//!
//! // Or without dotenvy (env vars must already be set):
//! let config = ConcordConfig::load().expect("config");
//!
//! println!("managed label: {}", config.sync.managed_label_name);
//! ```

mod error;
mod esi;
mod retry;
mod sync;

pub use error::ConfigError;
pub use esi::EsiSettings;
pub use retry::RetrySettings;
pub use sync::SyncSettings;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConcordConfig {
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub esi: EsiSettings,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl ConcordConfig {
    /// Load configuration from all sources (TOML files + environment
    /// variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source fails to parse or the
    /// merged configuration fails to extract.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root
    /// before building the figment. This is the typical entry point for the
    /// CLI and tests.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add additional
    /// providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".concord/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("CONCORD_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("concord").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir
    /// looking for a `.env` file. Silently does nothing if no `.env` is
    /// found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // Walk up at most 3 levels (crate -> crates/ -> workspace root)
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        // Fallback: try current directory
        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_loads() {
        let config = ConcordConfig::default();
        assert_eq!(config.sync.managed_label_name, "STANDINGS");
        assert_eq!(config.esi.max_write_batch, 100);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn figment_builds_without_files() {
        let figment = ConcordConfig::figment();
        let config: ConcordConfig = figment.extract().expect("should extract defaults");
        assert_eq!(config.esi.max_delete_batch, 20);
        assert_eq!(config.retry.base_delay_ms, 1000);
    }

    #[test]
    fn env_vars_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CONCORD_SYNC__MANAGED_LABEL_NAME", "DIPLOMACY");
            jail.set_env("CONCORD_RETRY__MAX_ATTEMPTS", "5");

            let config: ConcordConfig = ConcordConfig::figment().extract()?;
            assert_eq!(config.sync.managed_label_name, "DIPLOMACY");
            assert_eq!(config.retry.max_attempts, 5);
            Ok(())
        });
    }

    #[test]
    fn project_toml_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_dir(".concord")?;
            jail.create_file(
                ".concord/config.toml",
                r#"
                [sync]
                staleness_minutes = 60

                [esi]
                user_agent = "concord-test/0"
                "#,
            )?;

            let config: ConcordConfig = ConcordConfig::figment().extract()?;
            assert_eq!(config.sync.staleness_minutes, 60);
            assert_eq!(config.esi.user_agent, "concord-test/0");
            // untouched sections keep defaults
            assert_eq!(config.esi.max_write_batch, 100);
            Ok(())
        });
    }
}
