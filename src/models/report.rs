//! Workflow result and error records.

use crate::models::rollback::RollbackProgress;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Endpoint settings as read from the configuration store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSettings {
    pub server: String,
    /// `None` when the CA server was not part of the request.
    pub ca_server: Option<String>,
}

/// Report produced on full success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub original_settings: EndpointSettings,
    /// Re-read from the store after activation.
    pub new_settings: EndpointSettings,
    /// Copy of the state directory, left in place for the operator.
    pub backup_dir_path: Option<PathBuf>,
}

/// Error category exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Timeout,
    Uncaught,
}

/// Extra information attached to a [`WorkflowError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    /// Name of the originating condition.
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_started: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback_complete: Option<bool>,
}

/// Error record produced on any failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowError {
    pub message: String,
    pub kind: ErrorKind,
    pub details: ErrorDetails,
}

impl WorkflowError {
    /// Build the record for `error`, given how far rollback progressed.
    pub fn new(error: &Error, rollback: RollbackProgress) -> Self {
        let class = error.class_name().to_string();

        if error.is_timeout() {
            return Self {
                message: error.to_string(),
                kind: ErrorKind::Timeout,
                details: ErrorDetails {
                    class,
                    rollback_started: None,
                    rollback_complete: None,
                },
            };
        }

        Self {
            message: error.to_string(),
            kind: ErrorKind::Uncaught,
            details: ErrorDetails {
                class,
                rollback_started: Some(rollback.started),
                rollback_complete: Some(rollback.complete),
            },
        }
    }
}

/// The single record written at the end of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Envelope {
    Result(WorkflowResult),
    Error(WorkflowError),
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Result(_))
    }

    /// Serialize the envelope, optionally indented.
    pub fn to_json(&self, pretty: bool) -> crate::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timeout_error_has_no_rollback_flags() {
        let err = Error::ProbeTimeout {
            host: "ca.new".to_string(),
            port: 8140,
            timeout: Duration::from_secs(5),
        };
        let record = WorkflowError::new(&err, RollbackProgress::not_needed());
        let json = serde_json::to_value(Envelope::Error(record)).unwrap();

        assert_eq!(json["error"]["kind"], "Timeout");
        assert_eq!(json["error"]["details"]["class"], "ProbeTimeout");
        assert!(json["error"]["details"].get("rollbackStarted").is_none());
    }

    #[test]
    fn test_uncaught_error_carries_rollback_flags() {
        let err = Error::RollbackComplete {
            cause: "agent run failed".to_string(),
        };
        let record = WorkflowError::new(&err, RollbackProgress::finished());
        let json = serde_json::to_value(Envelope::Error(record)).unwrap();

        assert_eq!(json["error"]["kind"], "Uncaught");
        assert_eq!(json["error"]["details"]["rollbackStarted"], true);
        assert_eq!(json["error"]["details"]["rollbackComplete"], true);
    }

    #[test]
    fn test_result_envelope_shape() {
        let envelope = Envelope::Result(WorkflowResult {
            original_settings: EndpointSettings {
                server: "puppet.old".to_string(),
                ca_server: None,
            },
            new_settings: EndpointSettings {
                server: "puppet.new".to_string(),
                ca_server: None,
            },
            backup_dir_path: None,
        });
        assert!(envelope.is_success());

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["result"]["originalSettings"]["server"], "puppet.old");
        assert_eq!(json["result"]["newSettings"]["server"], "puppet.new");
        assert!(json["result"]["newSettings"]["caServer"].is_null());
        assert!(json["result"]["backupDirPath"].is_null());
    }
}
