//! Endpoint change workflow.
//!
//! Runs the phases in a fixed order:
//! - verify: probe the new endpoints (optional, nothing touched yet)
//! - snapshot: read `ssldir`, `server` and `ca_server`
//! - mutate: write the new endpoints
//! - back up state: move the SSL directory aside
//! - activate: run the agent against the new settings
//!
//! A failure after the first write unwinds every recorded step, so the store
//! ends up with either the old endpoints or the new ones, never a mix.

use crate::core::backup::BackupManager;
use crate::core::rollback::Journal;
use crate::models::report::{EndpointSettings, WorkflowError, WorkflowResult};
use crate::models::request::{ChangeRequest, CA_SERVER_SETTING, SERVER_SETTING, SSLDIR_SETTING};
use crate::models::rollback::{ReversibleAction, RollbackProgress, SettingSnapshot};
use crate::services::{Activator, ConfigStore, Prober};
use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;

/// Workflow phase, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Verifying,
    Snapshotting,
    Mutating,
    BackingUpState,
    Activating,
    RollingBack,
    Reporting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Verifying => "verifying",
            Phase::Snapshotting => "snapshotting",
            Phase::Mutating => "mutating",
            Phase::BackingUpState => "backing-up-state",
            Phase::Activating => "activating",
            Phase::RollingBack => "rolling-back",
            Phase::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// A failed run and how far its rollback got.
#[derive(Debug)]
pub struct WorkflowFailure {
    pub error: Error,
    pub rollback: RollbackProgress,
}

impl WorkflowFailure {
    /// Failure that needed no rollback.
    pub fn without_rollback(error: Error) -> Self {
        Self {
            error,
            rollback: RollbackProgress::not_needed(),
        }
    }
}

impl From<&WorkflowFailure> for WorkflowError {
    fn from(failure: &WorkflowFailure) -> Self {
        WorkflowError::new(&failure.error, failure.rollback)
    }
}

/// Values read before anything is changed.
#[derive(Debug)]
struct Snapshot {
    ssl_dir: PathBuf,
    server: SettingSnapshot,
    ca_server: Option<SettingSnapshot>,
}

/// Transactional endpoint change.
pub struct Workflow<'a> {
    store: &'a dyn ConfigStore,
    prober: &'a dyn Prober,
    activator: &'a dyn Activator,
    backup: BackupManager,
}

impl<'a> Workflow<'a> {
    pub fn new(
        store: &'a dyn ConfigStore,
        prober: &'a dyn Prober,
        activator: &'a dyn Activator,
    ) -> Self {
        Self {
            store,
            prober,
            activator,
            backup: BackupManager::new(),
        }
    }

    /// Run the workflow for `request`.
    pub async fn run(
        &self,
        request: &ChangeRequest,
    ) -> std::result::Result<WorkflowResult, WorkflowFailure> {
        request.validate().map_err(WorkflowFailure::without_rollback)?;

        if request.verify_connection {
            self.verify(request)
                .await
                .map_err(WorkflowFailure::without_rollback)?;
        }

        let snapshot = self
            .snapshot(request)
            .map_err(WorkflowFailure::without_rollback)?;

        let mut journal = Journal::new();
        let backup_dir = match self.apply(request, &snapshot, &mut journal) {
            Ok(backup_dir) => backup_dir,
            Err(e) => return Err(self.roll_back(&journal, e)),
        };

        tracing::info!(phase = %Phase::Activating, "Applying new settings");
        if let Err(e) = self.activator.activate() {
            return Err(self.roll_back(&journal, e));
        }

        let kept = backup_dir.clone();
        self.report(request, snapshot, backup_dir).map_err(|e| {
            let error = match kept {
                Some(backup) => {
                    tracing::error!("Settings applied, backup left at {:?}: {}", backup, e);
                    Error::Unreported {
                        backup: backup.display().to_string(),
                        source: Box::new(e),
                    }
                }
                None => e,
            };
            WorkflowFailure::without_rollback(error)
        })
    }

    async fn verify(&self, request: &ChangeRequest) -> Result<()> {
        let port = request
            .port
            .ok_or_else(|| Error::InvalidRequest("port is required for verification".to_string()))?;

        for host in request.endpoints() {
            tracing::info!(phase = %Phase::Verifying, "Checking {}:{}", host, port);
            self.prober.probe(host, port).await?;
        }
        Ok(())
    }

    fn snapshot(&self, request: &ChangeRequest) -> Result<Snapshot> {
        let section = &request.section;
        tracing::info!(phase = %Phase::Snapshotting, "Reading current settings from [{}]", section);

        let ssl_dir = PathBuf::from(self.store.config(SSLDIR_SETTING)?);
        let server = SettingSnapshot::new(
            SERVER_SETTING,
            section,
            self.store.get(SERVER_SETTING, section)?,
        );
        let ca_server = match request.ca_server {
            Some(_) => Some(SettingSnapshot::new(
                CA_SERVER_SETTING,
                section,
                self.store.get(CA_SERVER_SETTING, section)?,
            )),
            None => None,
        };

        tracing::debug!(
            "Snapshot: ssldir={:?} server={:?} ca_server={:?}",
            ssl_dir,
            server.value,
            ca_server.as_ref().map(|s| &s.value)
        );

        Ok(Snapshot {
            ssl_dir,
            server,
            ca_server,
        })
    }

    /// Write the new endpoints and move the state directory aside.
    fn apply(
        &self,
        request: &ChangeRequest,
        snapshot: &Snapshot,
        journal: &mut Journal,
    ) -> Result<Option<PathBuf>> {
        let section = &request.section;

        tracing::info!(phase = %Phase::Mutating, "Setting [{}] server = {}", section, request.server);
        journal.record(ReversibleAction::SetSetting(snapshot.server.clone()));
        self.store.set(SERVER_SETTING, section, &request.server)?;

        if let (Some(ca_server), Some(original)) = (&request.ca_server, &snapshot.ca_server) {
            tracing::info!(phase = %Phase::Mutating, "Setting [{}] ca_server = {}", section, ca_server);
            journal.record(ReversibleAction::SetSetting(original.clone()));
            self.store.set(CA_SERVER_SETTING, section, ca_server)?;
        }

        if !snapshot.ssl_dir.is_dir() {
            tracing::info!(
                phase = %Phase::BackingUpState,
                "No state directory at {:?}, nothing to back up",
                snapshot.ssl_dir
            );
            return Ok(None);
        }

        tracing::info!(phase = %Phase::BackingUpState, "Backing up {:?}", snapshot.ssl_dir);
        let dir_snapshot = self.backup.snapshot(&snapshot.ssl_dir)?;
        let backup_dir = dir_snapshot.backup.clone();
        journal.record(ReversibleAction::BackupDirectory(dir_snapshot));
        self.backup.purge_tree(&snapshot.ssl_dir)?;

        Ok(Some(backup_dir))
    }

    fn roll_back(&self, journal: &Journal, cause: Error) -> WorkflowFailure {
        if journal.is_empty() {
            return WorkflowFailure::without_rollback(cause);
        }

        tracing::warn!(phase = %Phase::RollingBack, "Rolling back after: {}", cause);

        match journal.unwind(self.store, &self.backup) {
            Ok(()) => {
                tracing::warn!(phase = %Phase::RollingBack, "Rollback complete");
                WorkflowFailure {
                    error: Error::RollbackComplete {
                        cause: cause.to_string(),
                    },
                    rollback: RollbackProgress::finished(),
                }
            }
            Err(e) => {
                tracing::error!(
                    phase = %Phase::RollingBack,
                    "Rollback failed, configuration may be inconsistent: {}",
                    e
                );
                WorkflowFailure {
                    error: Error::RollbackFailed {
                        cause: cause.to_string(),
                        source: Box::new(e),
                    },
                    rollback: RollbackProgress::interrupted(),
                }
            }
        }
    }

    fn report(
        &self,
        request: &ChangeRequest,
        snapshot: Snapshot,
        backup_dir: Option<PathBuf>,
    ) -> Result<WorkflowResult> {
        let section = &request.section;
        tracing::info!(phase = %Phase::Reporting, "Reading back applied settings");

        let new_server = self.store.get(SERVER_SETTING, section)?;
        let new_ca_server = match request.ca_server {
            Some(_) => Some(self.store.get(CA_SERVER_SETTING, section)?),
            None => None,
        };

        Ok(WorkflowResult {
            original_settings: EndpointSettings {
                server: snapshot.server.value,
                ca_server: snapshot.ca_server.map(|s| s.value),
            },
            new_settings: EndpointSettings {
                server: new_server,
                ca_server: new_ca_server,
            },
            backup_dir_path: backup_dir,
        })
    }
}
