//! Configuration model.
//!
//! Values can be overridden with environment variables:
//! - `PUPPET_RECONFIGURE_PUPPET_BIN`: path to the puppet executable
//! - `PUPPET_RECONFIGURE_PROBE_TIMEOUT`: probe timeout in seconds

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Puppet tool configuration.
    pub puppet: PuppetSettings,
    /// Reachability probe configuration.
    pub probe: ProbeSettings,
}

/// Puppet tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PuppetSettings {
    /// Explicit puppet executable. Resolved per platform when unset.
    pub bin: Option<PathBuf>,
    /// Arguments for the agent run that activates new settings.
    pub agent_args: Vec<String>,
    /// Agent exit codes that count as a successful run.
    pub agent_success_codes: Vec<i32>,
}

/// Reachability probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Connect deadline in seconds.
    pub timeout_secs: u64,
}

impl Default for PuppetSettings {
    fn default() -> Self {
        Self {
            bin: None,
            agent_args: vec!["agent".to_string(), "-t".to_string()],
            // `-t` implies --detailed-exitcodes: 2 means changes were applied.
            agent_success_codes: vec![0, 2],
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bin) = std::env::var("PUPPET_RECONFIGURE_PUPPET_BIN") {
            if !bin.is_empty() {
                self.puppet.bin = Some(PathBuf::from(bin));
            }
        }

        if let Some(secs) = std::env::var("PUPPET_RECONFIGURE_PROBE_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.probe.timeout_secs = secs;
        }

        self
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("puppet_reconfigure")
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Parse configuration from a TOML file.
pub fn read_config(path: &Path) -> crate::Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| crate::Error::other(format!("Invalid config {}: {}", path.display(), e)))
}

/// Load configuration from the default location, falling back to defaults.
pub fn load_config() -> AppConfig {
    let config_path = default_config_path();

    let config = if config_path.exists() {
        match read_config(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring configuration file: {}", e);
                AppConfig::default()
            }
        }
    } else {
        AppConfig::default()
    };

    config.with_env_overrides()
}
