//! Change request model.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Setting name of the primary server.
pub const SERVER_SETTING: &str = "server";
/// Setting name of the CA server.
pub const CA_SERVER_SETTING: &str = "ca_server";
/// Global setting holding the agent's SSL state directory.
pub const SSLDIR_SETTING: &str = "ssldir";

/// Requested endpoint change, read once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    /// New primary server.
    pub server: String,
    /// New CA server. `None` leaves the CA setting untouched.
    #[serde(default, alias = "ca_server", deserialize_with = "non_blank")]
    pub ca_server: Option<String>,
    /// Port used for reachability verification.
    #[serde(default)]
    pub port: Option<u16>,
    /// Configuration section the settings live under.
    pub section: String,
    /// Probe the new endpoints before touching anything.
    #[serde(default, alias = "verify_connection")]
    pub verify_connection: bool,
}

impl ChangeRequest {
    /// Parse a request from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let request: ChangeRequest = serde_json::from_str(text)?;
        Ok(request)
    }

    /// Check the request before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(Error::InvalidRequest("server must not be empty".to_string()));
        }
        if self.section.trim().is_empty() {
            return Err(Error::InvalidRequest("section must not be empty".to_string()));
        }
        if self.verify_connection && self.port.is_none() {
            return Err(Error::InvalidRequest(
                "port is required when verify_connection is set".to_string(),
            ));
        }
        Ok(())
    }

    /// Endpoints to probe, in probe order.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.server.as_str()).chain(self.ca_server.as_deref())
    }
}

/// Treat an empty CA server the same as an absent one.
fn non_blank<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}
