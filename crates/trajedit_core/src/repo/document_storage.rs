//! Document storage contract and filesystem implementation.
//!
//! # Responsibility
//! - List candidate trajectory files in one working directory.
//! - Read and write raw document bytes by file name.
//!
//! # Invariants
//! - Names are plain file names inside the root; path components are rejected.
//! - Listing is sorted by name so callers see a deterministic order.
//! - Writes replace the target atomically: a failed write leaves the previous
//!   file content untouched.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// Default extension for trajectory files.
pub const DEFAULT_EXTENSION: &str = "yaml";

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage failure for one document or directory.
#[derive(Debug)]
pub enum StorageError {
    Io {
        target: String,
        source: std::io::Error,
    },
    InvalidName(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { target, source } => write!(f, "io failure on `{target}`: {source}"),
            Self::InvalidName(name) => write!(f, "invalid document name: `{name}`"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidName(_) => None,
        }
    }
}

/// Storage collaborator for trajectory documents.
pub trait DocumentStorage {
    /// Returns candidate document names, filtered by extension.
    fn list_documents(&self) -> StorageResult<Vec<String>>;
    fn read_document(&self, name: &str) -> StorageResult<Vec<u8>>;
    fn write_document(&self, name: &str, bytes: &[u8]) -> StorageResult<()>;
}

/// Directory-backed document storage.
#[derive(Debug, Clone)]
pub struct FsDocumentStorage {
    root: PathBuf,
    extension: String,
}

impl FsDocumentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extension(root, DEFAULT_EXTENSION)
    }

    pub fn with_extension(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn document_path(&self, name: &str) -> StorageResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

impl DocumentStorage for FsDocumentStorage {
    fn list_documents(&self) -> StorageResult<Vec<String>> {
        let io_err = |source| StorageError::Io {
            target: self.root.display().to_string(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.file_type().map_err(io_err)?.is_file() {
                continue;
            }
            let path = entry.path();
            if !self.matches_extension(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();

        info!(
            "event=storage_list module=repo status=ok root={} count={}",
            self.root.display(),
            names.len()
        );
        Ok(names)
    }

    fn read_document(&self, name: &str) -> StorageResult<Vec<u8>> {
        let path = self.document_path(name)?;
        std::fs::read(&path).map_err(|source| {
            error!(
                "event=storage_read module=repo status=error name={} error={}",
                name, source
            );
            StorageError::Io {
                target: path.display().to_string(),
                source,
            }
        })
    }

    fn write_document(&self, name: &str, bytes: &[u8]) -> StorageResult<()> {
        let started_at = Instant::now();
        let path = self.document_path(name)?;

        match replace_file(&self.root, &path, |file| file.write_all(bytes)) {
            Ok(()) => {
                info!(
                    "event=storage_write module=repo status=ok name={} bytes={} duration_ms={}",
                    name,
                    bytes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    "event=storage_write module=repo status=error name={} duration_ms={} error={}",
                    name,
                    started_at.elapsed().as_millis(),
                    source
                );
                Err(StorageError::Io {
                    target: path.display().to_string(),
                    source,
                })
            }
        }
    }
}

/// Writes through a temporary file in `dir` and renames it over `path`.
///
/// The temporary file is removed when any step fails, so `path` either keeps
/// its old content or holds the complete new content.
fn replace_file(
    dir: &Path,
    path: &Path,
    write: impl FnOnce(&mut File) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn validate_name(name: &str) -> StorageResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{replace_file, validate_name, DocumentStorage, FsDocumentStorage, StorageError};
    use std::io::Write;

    #[test]
    fn validate_name_rejects_path_components() {
        for name in ["", " ", "..", "nested/a.yaml", "..\\a.yaml"] {
            assert!(
                matches!(validate_name(name), Err(StorageError::InvalidName(_))),
                "`{name}` should be rejected"
            );
        }
        assert!(validate_name("route_1.yaml").is_ok());
    }

    #[test]
    fn list_filters_by_extension_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), "poses: []\n").unwrap();
        std::fs::write(dir.path().join("a.YAML"), "poses: []\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();
        std::fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let storage = FsDocumentStorage::new(dir.path());
        assert_eq!(storage.list_documents().unwrap(), vec!["a.YAML", "b.yaml"]);
    }

    #[test]
    fn extension_leading_dot_is_ignored() {
        let storage = FsDocumentStorage::with_extension("/tmp", ".path");
        assert_eq!(storage.extension(), "path");
    }

    #[test]
    fn read_missing_document_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsDocumentStorage::new(dir.path());
        let err = storage.read_document("missing.yaml").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[test]
    fn write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsDocumentStorage::new(dir.path());
        std::fs::write(dir.path().join("route.yaml"), "poses: [old]\n").unwrap();

        storage.write_document("route.yaml", b"poses: []\n").unwrap();

        let written = std::fs::read(dir.path().join("route.yaml")).unwrap();
        assert_eq!(written, b"poses: []\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn interrupted_write_keeps_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.yaml");
        let original = "poses:\n  - position: {x: 1.0, y: 2.0}\n".repeat(64);
        std::fs::write(&path, &original).unwrap();

        let err = replace_file(dir.path(), &path, |file| {
            file.write_all(b"poses:\n  - position: {x: 9")?;
            Err(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "file size limit exceeded",
            ))
        })
        .unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::WriteZero);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_rename_is_io_failure_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("taken.yaml")).unwrap();
        std::fs::write(dir.path().join("taken.yaml").join("keep"), "x").unwrap();
        let storage = FsDocumentStorage::new(dir.path());

        let err = storage.write_document("taken.yaml", b"poses: []\n").unwrap_err();

        assert!(matches!(err, StorageError::Io { .. }));
        assert!(dir.path().join("taken.yaml").join("keep").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
