//! Managed public file storage.
//!
//! # Responsibility
//! - Copy bundled assets into the public files directory.
//! - Map `public://` uris back to real paths for cleanup.
//!
//! # Invariants
//! - A copy onto an existing file name replaces it.
//! - Uris never escape the public directory (basename only).

use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub const PUBLIC_SCHEME: &str = "public://";

pub type FileStoreResult<T> = Result<T, FileStoreError>;

#[derive(Debug)]
pub enum FileStoreError {
    Io { path: PathBuf, source: io::Error },
    InvalidUri(String),
}

impl Display for FileStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "file operation on `{}` failed: {source}", path.display())
            }
            Self::InvalidUri(uri) => write!(f, "not a public file uri: `{uri}`"),
        }
    }
}

impl Error for FileStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidUri(_) => None,
        }
    }
}

/// Public file directory, the target of `public://` uris.
#[derive(Debug, Clone)]
pub struct PublicFiles {
    root: PathBuf,
}

impl PublicFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copies `source` to `public://<basename>`, replacing any existing file.
    ///
    /// Returns `Ok(None)` when the source does not exist.
    pub fn copy_replace(&self, source: &Path) -> FileStoreResult<Option<String>> {
        if !source.is_file() {
            warn!(
                "event=file_copy module=files status=skip reason=missing_source path={}",
                source.display()
            );
            return Ok(None);
        }
        let Some(filename) = source.file_name().and_then(|name| name.to_str()) else {
            return Err(FileStoreError::InvalidUri(source.display().to_string()));
        };

        std::fs::create_dir_all(&self.root).map_err(|err| FileStoreError::Io {
            path: self.root.clone(),
            source: err,
        })?;
        let destination = self.root.join(filename);
        std::fs::copy(source, &destination).map_err(|err| FileStoreError::Io {
            path: destination.clone(),
            source: err,
        })?;

        debug!(
            "event=file_copy module=files status=ok destination={}",
            destination.display()
        );
        Ok(Some(format!("{PUBLIC_SCHEME}{filename}")))
    }

    /// Resolves a `public://` uri to a path under the public directory.
    pub fn real_path(&self, uri: &str) -> FileStoreResult<PathBuf> {
        let name = uri
            .strip_prefix(PUBLIC_SCHEME)
            .filter(|name| !name.is_empty() && !name.contains('/') && *name != "..")
            .ok_or_else(|| FileStoreError::InvalidUri(uri.to_string()))?;
        Ok(self.root.join(name))
    }

    /// Removes the file behind `uri`; a file that is already gone is fine.
    pub fn remove(&self, uri: &str) -> FileStoreResult<()> {
        let path = self.real_path(uri)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(FileStoreError::Io { path, source: err }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PublicFiles;

    #[test]
    fn copy_replace_overwrites_existing_file() {
        let source_dir = tempfile::tempdir().unwrap();
        let public_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("logo.png");
        std::fs::write(&source, b"first").unwrap();

        let files = PublicFiles::new(public_dir.path());
        let uri = files.copy_replace(&source).unwrap().unwrap();
        assert_eq!(uri, "public://logo.png");

        std::fs::write(&source, b"second").unwrap();
        files.copy_replace(&source).unwrap();
        let copied = std::fs::read(public_dir.path().join("logo.png")).unwrap();
        assert_eq!(copied, b"second");
    }

    #[test]
    fn copy_replace_skips_missing_source() {
        let public_dir = tempfile::tempdir().unwrap();
        let files = PublicFiles::new(public_dir.path());
        let missing = public_dir.path().join("nope.jpg");
        assert_eq!(files.copy_replace(&missing).unwrap(), None);
    }

    #[test]
    fn real_path_rejects_foreign_uris() {
        let files = PublicFiles::new("/tmp/public");
        assert!(files.real_path("private://x.png").is_err());
        assert!(files.real_path("public://../x.png").is_err());
        assert!(files.real_path("public://").is_err());
        assert!(files.real_path("public://x.png").is_ok());
    }

    #[test]
    fn remove_tolerates_missing_file() {
        let public_dir = tempfile::tempdir().unwrap();
        let files = PublicFiles::new(public_dir.path());
        files.remove("public://gone.png").unwrap();
    }
}
