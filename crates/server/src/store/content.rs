// Content file operations: the filesystem effect behind every handler.
//
// Every operation takes the client-supplied relative path and resolves it
// through the workspace confinement layer before touching the filesystem.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use vellum_common::path::{resolve_under_root, PathError};

use super::history::{HistoryStore, SnapshotOutcome};
use crate::yaml::{self, YamlDiagnostic};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("file or directory does not exist: {path}")]
    NotFound { path: String },

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("file is not valid UTF-8 text: {path}")]
    InvalidEncoding { path: String },

    #[error(transparent)]
    InvalidYaml(YamlDiagnostic),

    #[error(transparent)]
    Io(io::Error),
}

impl ContentError {
    fn from_io(error: io::Error, path: &str) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path: path.to_string() },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path: path.to_string() },
            _ => Self::Io(error),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentStore {
    history: HistoryStore,
}

impl ContentStore {
    pub fn new(history: HistoryStore) -> Self {
        Self { history }
    }

    /// Read a file's text content.
    pub fn read(&self, root: &Path, relative: &str) -> Result<String, ContentError> {
        let target = resolve_under_root(root, relative)?;

        let bytes = fs::read(&target).map_err(|error| ContentError::from_io(error, relative))?;
        String::from_utf8(bytes)
            .map_err(|_| ContentError::InvalidEncoding { path: relative.to_string() })
    }

    /// Validate and write a content file.
    ///
    /// YAML validation happens before any filesystem change; a syntax error
    /// leaves the previous content untouched. On success the previous
    /// version is snapshotted best-effort, then the target is overwritten.
    pub fn write(
        &self,
        root: &Path,
        relative: &str,
        content: &str,
    ) -> Result<SnapshotOutcome, ContentError> {
        yaml::validate(content).map_err(ContentError::InvalidYaml)?;

        let target = resolve_under_root(root, relative)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| ContentError::from_io(error, relative))?;
        }

        let outcome = self.history.snapshot(root, relative, content);

        fs::write(&target, content).map_err(|error| ContentError::from_io(error, relative))?;

        Ok(outcome)
    }

    /// Delete a file, an empty directory, or a directory tree.
    pub fn delete(&self, root: &Path, relative: &str) -> Result<(), ContentError> {
        let target = resolve_under_root(root, relative)?;

        let metadata = fs::symlink_metadata(&target)
            .map_err(|error| ContentError::from_io(error, relative))?;

        let result = if metadata.is_dir() {
            let is_empty = fs::read_dir(&target)
                .map_err(|error| ContentError::from_io(error, relative))?
                .next()
                .is_none();
            if is_empty {
                fs::remove_dir(&target)
            } else {
                fs::remove_dir_all(&target)
            }
        } else {
            fs::remove_file(&target)
        };

        result.map_err(|error| ContentError::from_io(error, relative))
    }

    /// Create a directory, including missing intermediate segments.
    /// Idempotent: succeeds silently when the directory already exists.
    pub fn create_dir(&self, root: &Path, relative: &str) -> Result<(), ContentError> {
        let target = resolve_under_root(root, relative)?;
        fs::create_dir_all(&target).map_err(|error| ContentError::from_io(error, relative))
    }

    /// Move a file or directory inside the workspace. The target's parent is
    /// created as needed. No history snapshot is taken for moves.
    pub fn rename(
        &self,
        root: &Path,
        source_relative: &str,
        target_relative: &str,
    ) -> Result<(), ContentError> {
        let source = resolve_under_root(root, source_relative)?;
        let target = resolve_under_root(root, target_relative)?;

        if !source.exists() {
            return Err(ContentError::NotFound { path: source_relative.to_string() });
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| ContentError::from_io(error, target_relative))?;
        }

        match fs::rename(&source, &target) {
            Ok(()) => Ok(()),
            // Rename can fail across filesystems; fall back to copy+remove
            // for plain files.
            Err(_) if source.is_file() => {
                fs::copy(&source, &target)
                    .map_err(|error| ContentError::from_io(error, target_relative))?;
                fs::remove_file(&source)
                    .map_err(|error| ContentError::from_io(error, source_relative))?;
                Ok(())
            }
            Err(error) => Err(ContentError::from_io(error, source_relative)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vellum_common::path::PathError;

    fn store() -> ContentStore {
        ContentStore::default()
    }

    #[test]
    fn write_then_read_round_trips_exactly() {
        let dir = TempDir::new().unwrap();
        let content = "server:\n  host: localhost\n  port: 8000\n";

        store().write(dir.path(), "configs/app.yaml", content).unwrap();
        let read_back = store().read(dir.path(), "configs/app.yaml").unwrap();

        assert_eq!(read_back, content);
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        store().write(dir.path(), "a/b/c/deep.yaml", "x: 1\n").unwrap();
        assert!(dir.path().join("a/b/c/deep.yaml").is_file());
    }

    #[test]
    fn write_records_a_snapshot() {
        let dir = TempDir::new().unwrap();
        let outcome = store().write(dir.path(), "app.yaml", "x: 1\n").unwrap();

        let snapshot = outcome.recorded().expect("snapshot should be recorded");
        assert!(snapshot.name.starts_with("app_"));
        assert!(dir.path().join(&snapshot.history_path).is_file());
    }

    #[test]
    fn invalid_yaml_leaves_previous_content_untouched() {
        let dir = TempDir::new().unwrap();
        store().write(dir.path(), "app.yaml", "a: 1\n").unwrap();

        let error = store().write(dir.path(), "app.yaml", "a: b: c").unwrap_err();
        assert!(matches!(error, ContentError::InvalidYaml(_)));

        assert_eq!(store().read(dir.path(), "app.yaml").unwrap(), "a: 1\n");
    }

    #[test]
    fn invalid_yaml_to_new_path_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let error = store().write(dir.path(), "new/app.yaml", "a: b: c").unwrap_err();
        assert!(matches!(error, ContentError::InvalidYaml(_)));
        assert!(!dir.path().join("new").exists());
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let error = store().read(dir.path(), "missing.yaml").unwrap_err();
        assert!(matches!(error, ContentError::NotFound { .. }));
    }

    #[test]
    fn read_non_utf8_is_invalid_encoding() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("binary.yaml"), [0xff, 0xfe, 0x00, 0x01]).unwrap();

        let error = store().read(dir.path(), "binary.yaml").unwrap_err();
        assert!(matches!(error, ContentError::InvalidEncoding { .. }));
    }

    #[test]
    fn traversal_is_rejected_without_filesystem_effect() {
        let dir = TempDir::new().unwrap();

        let error = store().write(dir.path(), "../escape.yaml", "x: 1\n").unwrap_err();
        assert!(matches!(
            error,
            ContentError::Path(PathError::Traversal(_))
        ));
        assert!(!dir.path().parent().unwrap().join("escape.yaml").exists());
    }

    #[test]
    fn delete_file_and_missing_target() {
        let dir = TempDir::new().unwrap();
        store().write(dir.path(), "app.yaml", "x: 1\n").unwrap();

        store().delete(dir.path(), "app.yaml").unwrap();
        assert!(!dir.path().join("app.yaml").exists());

        let error = store().delete(dir.path(), "app.yaml").unwrap_err();
        assert!(matches!(error, ContentError::NotFound { .. }));
    }

    #[test]
    fn delete_removes_non_empty_directory_recursively() {
        let dir = TempDir::new().unwrap();
        store().write(dir.path(), "sub/one.yaml", "a: 1\n").unwrap();
        store().write(dir.path(), "sub/nested/two.yaml", "b: 2\n").unwrap();

        store().delete(dir.path(), "sub").unwrap();
        assert!(!dir.path().join("sub").exists());
    }

    #[test]
    fn delete_removes_empty_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        store().delete(dir.path(), "empty").unwrap();
        assert!(!dir.path().join("empty").exists());
    }

    #[test]
    fn create_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        store().create_dir(dir.path(), "nested/path").unwrap();
        store().create_dir(dir.path(), "nested/path").unwrap();
        assert!(dir.path().join("nested/path").is_dir());
    }

    #[test]
    fn rename_creates_target_parent() {
        let dir = TempDir::new().unwrap();
        store().write(dir.path(), "sub/a.yaml", "x: 1\n").unwrap();

        store().rename(dir.path(), "sub/a.yaml", "other/a.yaml").unwrap();

        assert!(!dir.path().join("sub/a.yaml").exists());
        assert_eq!(store().read(dir.path(), "other/a.yaml").unwrap(), "x: 1\n");
    }

    #[test]
    fn rename_missing_source_is_not_found_and_creates_no_target() {
        let dir = TempDir::new().unwrap();

        let error = store().rename(dir.path(), "missing.yaml", "other/a.yaml").unwrap_err();
        assert!(matches!(error, ContentError::NotFound { .. }));
        assert!(!dir.path().join("other/a.yaml").exists());
    }

    #[test]
    fn rename_validates_both_endpoints() {
        let dir = TempDir::new().unwrap();
        store().write(dir.path(), "a.yaml", "x: 1\n").unwrap();

        let error = store().rename(dir.path(), "a.yaml", "../outside.yaml").unwrap_err();
        assert!(matches!(error, ContentError::Path(_)));
        assert!(dir.path().join("a.yaml").exists());
    }
}
