//! Error types for puppet reconfiguration.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for puppet reconfiguration.
#[derive(Error, Debug)]
pub enum Error {
    // Reachability errors
    #[error("Timeout connecting to {host} over port {port} after {timeout:?}")]
    ProbeTimeout {
        host: String,
        port: u16,
        timeout: Duration,
    },

    #[error("Unable to connect to {host} over port {port}: {reason}")]
    ProbeFailed {
        host: String,
        port: u16,
        reason: String,
    },

    // Configuration tool errors
    #[error("`{command}` failed: {stderr}")]
    ConfigTool { command: String, stderr: String },

    #[error("puppet executable not found: {0}")]
    ToolNotFound(String),

    // Activation errors
    #[error("puppet agent run failed (exit code {code:?}): {stderr}")]
    ActivationFailed { code: Option<i32>, stderr: String },

    // Rollback errors
    #[error("Unable to apply new settings. Rollback complete. Error: {cause}")]
    RollbackComplete { cause: String },

    #[error("Rollback failed: {source}. Original error: {cause}")]
    RollbackFailed {
        cause: String,
        #[source]
        source: Box<Error>,
    },

    #[error("New settings are active but could not be read back: {source}. SSL state backup kept at {backup}")]
    Unreported {
        backup: String,
        #[source]
        source: Box<Error>,
    },

    // Backup errors
    #[error("Backup {backup} does not match {original}")]
    BackupMismatch { original: String, backup: String },

    // Request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error is a reachability deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::ProbeTimeout { .. })
    }

    /// Stable name of the error condition, reported as `details.class`.
    pub fn class_name(&self) -> &'static str {
        match self {
            Error::ProbeTimeout { .. } => "ProbeTimeout",
            Error::ProbeFailed { .. } => "ProbeFailed",
            Error::ConfigTool { .. } => "ConfigToolError",
            Error::ToolNotFound(_) => "ToolNotFound",
            Error::ActivationFailed { .. } => "ActivationFailed",
            Error::RollbackComplete { .. } => "RollbackComplete",
            Error::RollbackFailed { .. } => "RollbackFailed",
            Error::Unreported { source, .. } => source.class_name(),
            Error::BackupMismatch { .. } => "BackupMismatch",
            Error::InvalidRequest(_) => "InvalidRequest",
            Error::PathNotFound(_) => "PathNotFound",
            Error::Io(_) => "IOError",
            Error::Walk(_) => "IOError",
            Error::Json(_) => "JSONError",
            Error::Other(_) => "Error",
        }
    }
}
