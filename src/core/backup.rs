//! State directory backup and restore.
//!
//! Copies, moves and purges directory trees so the agent's SSL directory can be
//! set aside while new endpoints are tried, and put back if they fail.

use crate::models::rollback::DirectorySnapshot;
use crate::utils::{fs as fsutil, hash};
use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix appended to the state directory name for its backup.
pub const BACKUP_SUFFIX: &str = "_backup";

/// Backup location for `dir`.
pub fn backup_path_for(dir: &Path) -> PathBuf {
    fsutil::sibling_with_suffix(dir, BACKUP_SUFFIX)
}

/// Directory tree backup manager.
#[derive(Debug, Clone, Default)]
pub struct BackupManager;

impl BackupManager {
    /// Create a new backup manager.
    pub fn new() -> Self {
        Self
    }

    /// Recursively copy `source` into `destination`.
    ///
    /// Existing files at the destination are overwritten entry by entry.
    pub fn copy_tree(&self, source: &Path, destination: &Path) -> Result<()> {
        fsutil::ensure_directory(source)?;

        let mut dirs = Vec::new();

        for entry in WalkDir::new(source).follow_links(false) {
            let entry = entry?;
            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            let target = destination.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
                dirs.push((target, entry.metadata()?.permissions()));
            } else if file_type.is_symlink() {
                fsutil::copy_symlink(entry.path(), &target)?;
            } else {
                fs::copy(entry.path(), &target)?;
            }
        }

        // Restrictive directory modes (private_keys is 0750) go on last so
        // they don't block writing the entries beneath them.
        for (dir, permissions) in dirs.into_iter().rev() {
            fs::set_permissions(&dir, permissions)?;
        }

        tracing::debug!("Copied {:?} -> {:?}", source, destination);
        Ok(())
    }

    /// Recursively move `source` to `destination`, overwriting colliding files.
    pub fn move_tree(&self, source: &Path, destination: &Path) -> Result<()> {
        if !source.exists() {
            return Err(Error::PathNotFound(source.display().to_string()));
        }

        // Try rename first (fast, same filesystem, nothing in the way)
        if destination.symlink_metadata().is_err() && fs::rename(source, destination).is_ok() {
            tracing::debug!("Renamed {:?} -> {:?}", source, destination);
            return Ok(());
        }

        // Fall back to copy + purge (cross filesystem or merging onto a tree)
        self.copy_tree(source, destination)?;
        self.purge_tree(source)?;
        tracing::debug!("Moved {:?} -> {:?}", source, destination);
        Ok(())
    }

    /// Recursively delete `path`. A missing path is not an error.
    pub fn purge_tree(&self, path: &Path) -> Result<()> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let removed = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        match removed {
            Ok(()) => {
                tracing::debug!("Purged {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Copy `dir` to its backup location and verify the copy.
    ///
    /// A backup left behind by an earlier run is replaced. The original is left
    /// untouched; purging it is up to the caller.
    pub fn snapshot(&self, dir: &Path) -> Result<DirectorySnapshot> {
        let backup = backup_path_for(dir);

        if backup.exists() {
            tracing::warn!("Replacing stale backup at {:?}", backup);
            self.purge_tree(&backup)?;
        }

        if let Err(e) = self.copy_tree(dir, &backup).and_then(|_| self.verify(dir, &backup)) {
            if let Err(cleanup) = self.purge_tree(&backup) {
                tracing::error!("Failed to remove partial backup {:?}: {}", backup, cleanup);
            }
            return Err(e);
        }

        tracing::info!("Backed up {:?} to {:?}", dir, backup);
        Ok(DirectorySnapshot {
            original: dir.to_path_buf(),
            backup,
        })
    }

    /// Put a snapshot back in place of whatever sits at the original path.
    pub fn restore(&self, snapshot: &DirectorySnapshot) -> Result<()> {
        self.purge_tree(&snapshot.original)?;
        self.move_tree(&snapshot.backup, &snapshot.original)?;
        tracing::info!("Restored {:?} from {:?}", snapshot.original, snapshot.backup);
        Ok(())
    }

    /// Compare tree digests of the original and its copy.
    fn verify(&self, original: &Path, backup: &Path) -> Result<()> {
        if hash::sha256_tree(original)? != hash::sha256_tree(backup)? {
            return Err(Error::BackupMismatch {
                original: original.display().to_string(),
                backup: backup.display().to_string(),
            });
        }
        Ok(())
    }
}
