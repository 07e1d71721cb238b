//! Rollback data model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A setting value captured before mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingSnapshot {
    /// Setting name.
    pub setting: String,
    /// Section the value was read from.
    pub section: String,
    /// Value at snapshot time.
    pub value: String,
}

impl SettingSnapshot {
    pub fn new(setting: &str, section: &str, value: String) -> Self {
        Self {
            setting: setting.to_string(),
            section: section.to_string(),
            value,
        }
    }
}

/// A directory copied aside before the original was purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// Location of the live directory.
    pub original: PathBuf,
    /// Location of the copy.
    pub backup: PathBuf,
}

/// A forward step whose undo is known up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReversibleAction {
    /// A setting was overwritten; undo writes the snapshot back.
    SetSetting(SettingSnapshot),
    /// The state directory was moved aside; undo moves it back.
    BackupDirectory(DirectorySnapshot),
}

/// How far recovery got after a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackProgress {
    /// Undo steps were attempted.
    pub started: bool,
    /// Every undo step succeeded.
    pub complete: bool,
}

impl RollbackProgress {
    /// Nothing was mutated, so no rollback ran.
    pub fn not_needed() -> Self {
        Self::default()
    }

    pub fn finished() -> Self {
        Self {
            started: true,
            complete: true,
        }
    }

    pub fn interrupted() -> Self {
        Self {
            started: true,
            complete: false,
        }
    }
}
