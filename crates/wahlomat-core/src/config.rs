//! Application configuration model.
//!
//! Every key is optional; a missing key falls back to the built-in default. The API key
//! is deliberately not part of the configuration.

use crate::assistant::AssistantIds;
use crate::error::Result;
use crate::party::{DEFAULT_PARTIES, DEFAULT_PARTY, PartyCatalog};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    #[serde(default)]
    pub assistants: AssistantIds,
    #[serde(default)]
    pub parties: PartiesConfig,
}

/// `[parties]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartiesConfig {
    #[serde(default = "default_party_names")]
    pub names: Vec<String>,
    #[serde(default = "default_party")]
    pub default: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_run_timeout_secs() -> u64 {
    DEFAULT_RUN_TIMEOUT_SECS
}

fn default_party_names() -> Vec<String> {
    DEFAULT_PARTIES.iter().map(|s| (*s).to_string()).collect()
}

fn default_party() -> String {
    DEFAULT_PARTY.to_string()
}

impl Default for PartiesConfig {
    fn default() -> Self {
        Self {
            names: default_party_names(),
            default: default_party(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_secs: default_run_timeout_secs(),
            assistants: AssistantIds::default(),
            parties: PartiesConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that can't be expressed through serde defaults.
    pub fn validate(&self) -> Result<()> {
        use crate::error::WahlError;

        if self.base_url.trim().is_empty() {
            return Err(WahlError::config("base_url must not be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(WahlError::config("poll_interval_ms must be greater than 0"));
        }
        if self.run_timeout_secs == 0 {
            return Err(WahlError::config("run_timeout_secs must be greater than 0"));
        }
        for (name, id) in [
            ("main", &self.assistants.main),
            ("analysis", &self.assistants.analysis),
            ("party_comparison", &self.assistants.party_comparison),
        ] {
            if id.trim().is_empty() {
                return Err(WahlError::config(format!(
                    "assistants.{name} must not be empty"
                )));
            }
        }
        self.party_catalog().map(|_| ())
    }

    pub fn party_catalog(&self) -> Result<PartyCatalog> {
        PartyCatalog::new(self.parties.names.iter().cloned(), &self.parties.default)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}
