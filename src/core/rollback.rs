//! Undo journal.
//!
//! Records each reversible step before it runs and replays the undo steps in
//! reverse order when a later step fails.

use crate::core::backup::BackupManager;
use crate::models::rollback::{ReversibleAction, SettingSnapshot};
use crate::services::ConfigStore;
use crate::Result;

/// Ordered record of reversible actions taken so far.
#[derive(Debug, Default)]
pub struct Journal {
    actions: Vec<ReversibleAction>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action. Call before performing it.
    pub fn record(&mut self, action: ReversibleAction) {
        tracing::debug!("Journal: {:?}", action);
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Undo every recorded action, newest first.
    ///
    /// Stops at the first undo step that fails and returns its error.
    pub fn unwind(&self, store: &dyn ConfigStore, backup: &BackupManager) -> Result<()> {
        for action in self.actions.iter().rev() {
            undo(action, store, backup)?;
        }
        Ok(())
    }
}

fn undo(action: &ReversibleAction, store: &dyn ConfigStore, backup: &BackupManager) -> Result<()> {
    match action {
        ReversibleAction::SetSetting(snapshot) => restore_setting(snapshot, store),
        ReversibleAction::BackupDirectory(snapshot) => backup.restore(snapshot),
    }
}

fn restore_setting(snapshot: &SettingSnapshot, store: &dyn ConfigStore) -> Result<()> {
    if snapshot.value.is_empty() {
        store.delete(&snapshot.setting, &snapshot.section)?;
        tracing::info!(
            "Removed [{}] {} override",
            snapshot.section,
            snapshot.setting
        );
    } else {
        store.set(&snapshot.setting, &snapshot.section, &snapshot.value)?;
        tracing::info!(
            "Restored [{}] {} = {}",
            snapshot.section,
            snapshot.setting,
            snapshot.value
        );
    }
    Ok(())
}
