//! Content digests used to verify backups.

use crate::Result;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use walkdir::WalkDir;

/// SHA-256 over a directory tree: relative paths, entry types and file contents.
///
/// Two trees with the same layout and bytes hash equal regardless of where they live.
pub fn sha256_tree(root: &Path) -> Result<String> {
    let mut hasher = Sha256::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let file_type = entry.file_type();

        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update([0u8]);

        if file_type.is_dir() {
            hasher.update(b"d");
        } else if file_type.is_symlink() {
            hasher.update(b"l");
            let target = std::fs::read_link(entry.path())?;
            hasher.update(target.to_string_lossy().as_bytes());
        } else {
            hasher.update(b"f");
            feed_file(&mut hasher, entry.path())?;
        }
        hasher.update([0u8]);
    }

    Ok(to_hex(&hasher.finalize()))
}

fn feed_file(hasher: &mut Sha256, path: &Path) -> Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_feed_file_known_value() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty");
        fs::write(&path, "").unwrap();

        let mut hasher = Sha256::new();
        feed_file(&mut hasher, &path).unwrap();
        assert_eq!(
            to_hex(&hasher.finalize()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_tree_digest_ignores_location() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a", "b"] {
            let root = temp_dir.path().join(name);
            fs::create_dir_all(root.join("certs")).unwrap();
            fs::write(root.join("certs/ca.pem"), "ca").unwrap();
        }

        assert_eq!(
            sha256_tree(&temp_dir.path().join("a")).unwrap(),
            sha256_tree(&temp_dir.path().join("b")).unwrap()
        );
    }

    #[test]
    fn test_tree_digest_sees_content_and_names() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ssl");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("key.pem"), "one").unwrap();
        let before = sha256_tree(&root).unwrap();

        fs::write(root.join("key.pem"), "two").unwrap();
        let changed = sha256_tree(&root).unwrap();
        assert_ne!(before, changed);

        fs::rename(root.join("key.pem"), root.join("other.pem")).unwrap();
        assert_ne!(changed, sha256_tree(&root).unwrap());
    }
}
