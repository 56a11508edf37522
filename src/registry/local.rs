//! Filesystem-backed artifact registry.
//!
//! Layout: `<root>/<model name>/v<N>/...`. Anything under a version
//! directory is part of that version's bundle.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{ArtifactRegistry, ArtifactVersion, RegistryError};

/// Registry rooted at a local (or mounted) directory.
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactRegistry for LocalRegistry {
    fn list_versions(&self, name: &str) -> Result<Option<Vec<ArtifactVersion>>, RegistryError> {
        let collection = self.root.join(name);
        if !collection.is_dir() {
            return Ok(None);
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(&collection)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            match file_name.to_str().and_then(ArtifactVersion::parse) {
                Some(version) => versions.push(version),
                None => debug!(entry = ?file_name, model = name, "ignoring non-version entry"),
            }
        }
        Ok(Some(versions))
    }

    fn download(&self, name: &str, identifier: &str, dest: &Path) -> Result<PathBuf, RegistryError> {
        let source = self.root.join(name).join(identifier);
        if !source.is_dir() {
            return Err(RegistryError::VersionNotFound {
                name: name.to_string(),
                version: identifier.to_string(),
            });
        }

        // Overwrite: stale files from an earlier download must not be picked up.
        if dest.exists() {
            fs::remove_dir_all(dest)?;
        }
        fs::create_dir_all(dest)?;

        let mut copied = 0usize;
        for entry in WalkDir::new(&source).min_depth(1) {
            let entry = entry.map_err(|e| RegistryError::Transport(e.to_string()))?;
            let relative = entry
                .path()
                .strip_prefix(&source)
                .map_err(|e| RegistryError::Transport(e.to_string()))?;
            let target = dest.join(relative);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else if entry.file_type().is_file() {
                fs::copy(entry.path(), &target)?;
                copied += 1;
            }
        }

        info!(model = name, version = identifier, files = copied, dest = %dest.display(), "artifact downloaded");
        Ok(dest.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publish(root: &Path, name: &str, version: &str, files: &[(&str, &[u8])]) {
        let dir = root.join(name).join(version);
        for (path, bytes) in files {
            let target = dir.join(path);
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::write(target, bytes).unwrap();
        }
    }

    #[test]
    fn test_list_versions_ignores_other_entries() {
        let tmp = tempfile::tempdir().unwrap();
        publish(tmp.path(), "logreg_angle", "v1", &[("model.bin", b"a")]);
        publish(tmp.path(), "logreg_angle", "v12", &[("model.bin", b"b")]);
        publish(tmp.path(), "logreg_angle", "scratch", &[("notes.txt", b"c")]);
        fs::write(tmp.path().join("logreg_angle").join("v3"), b"file, not dir").unwrap();

        let registry = LocalRegistry::new(tmp.path());
        let mut versions = registry.list_versions("logreg_angle").unwrap().unwrap();
        versions.sort_by_key(|v| v.index);
        assert_eq!(versions, vec![ArtifactVersion::new(1), ArtifactVersion::new(12)]);
    }

    #[test]
    fn test_list_versions_unknown_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(tmp.path());
        assert!(registry.list_versions("nope").unwrap().is_none());
    }

    #[test]
    fn test_download_copies_nested_tree_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("registry");
        publish(&root, "m", "v1", &[("model.bin", b"1"), ("nested/enc.bin", b"22")]);

        let dest = tmp.path().join("staging");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.bin"), b"old").unwrap();

        let registry = LocalRegistry::new(&root);
        let out = registry.download("m", "v1", &dest).unwrap();
        assert_eq!(out, dest);
        assert_eq!(fs::read(dest.join("model.bin")).unwrap(), b"1");
        assert_eq!(fs::read(dest.join("nested/enc.bin")).unwrap(), b"22");
        assert!(!dest.join("stale.bin").exists());
    }

    #[test]
    fn test_download_missing_version() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(tmp.path());
        let err = registry.download("m", "v4", &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, RegistryError::VersionNotFound { .. }));
    }
}
