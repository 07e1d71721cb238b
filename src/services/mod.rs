//! Collaborators the workflow drives: the configuration tool, the agent and the network.

pub mod probe;
pub mod puppet;

pub use probe::{Prober, TcpProber};
pub use puppet::{resolve_puppet_bin, Activator, ConfigStore, PuppetAgent, PuppetConfig, SettingAck};

use crate::models::config::AppConfig;

/// Production collaborators built from configuration.
#[derive(Debug, Clone)]
pub struct Services {
    pub store: PuppetConfig,
    pub agent: PuppetAgent,
    pub prober: TcpProber,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Self {
        let bin = resolve_puppet_bin(config.puppet.bin.as_deref());
        tracing::debug!("Using puppet executable {}", bin.display());

        Self {
            store: PuppetConfig::new(bin.clone()),
            agent: PuppetAgent::new(
                bin,
                config.puppet.agent_args.clone(),
                config.puppet.agent_success_codes.clone(),
            ),
            prober: TcpProber::new(config.probe.timeout()),
        }
    }
}
