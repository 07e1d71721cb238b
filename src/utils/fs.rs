//! File system utilities.

use crate::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::Other(format!(
            "Not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Sibling of `path` with `suffix` appended to its final component.
///
/// `/etc/puppetlabs/puppet/ssl` + `_backup` -> `/etc/puppetlabs/puppet/ssl_backup`
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let trimmed: PathBuf = path.components().collect();
    let mut name: OsString = trimmed
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    trimmed.with_file_name(name)
}

/// Recreate the symlink at `from` as `to`, replacing whatever is there.
#[cfg(unix)]
pub fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let target = std::fs::read_link(from)?;
    if to.symlink_metadata().is_ok() {
        std::fs::remove_file(to)?;
    }
    std::os::unix::fs::symlink(target, to)?;
    Ok(())
}

/// Copy the symlink's target contents, since links need privileges here.
#[cfg(not(unix))]
pub fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    std::fs::copy(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_with_suffix() {
        assert_eq!(
            sibling_with_suffix(Path::new("/etc/puppetlabs/puppet/ssl"), "_backup"),
            PathBuf::from("/etc/puppetlabs/puppet/ssl_backup")
        );
        assert_eq!(
            sibling_with_suffix(Path::new("/var/lib/puppet/ssl/"), "_backup"),
            PathBuf::from("/var/lib/puppet/ssl_backup")
        );
    }

    #[test]
    fn test_ensure_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(ensure_directory(temp_dir.path()).is_ok());

        let file = temp_dir.path().join("file.pem");
        std::fs::write(&file, "cert").unwrap();
        assert!(ensure_directory(&file).is_err());
        assert!(matches!(
            ensure_directory(&temp_dir.path().join("missing")),
            Err(crate::Error::PathNotFound(_))
        ));
    }
}
