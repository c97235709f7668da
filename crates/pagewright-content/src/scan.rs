//! Content directory listing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur when listing a content directory.
///
/// An existing but empty directory is not an error; it lists as `Ok(vec![])`.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Content directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Permission denied reading content directory: {0}")]
    PermissionDenied(PathBuf),

    #[error("Content path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read content directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

/// List the regular files directly inside `dir`.
///
/// The listing is non-recursive: subdirectories are skipped. Paths are
/// returned sorted by file name so discovery order is stable across
/// platforms.
pub fn scan_dir(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if dir.exists() && !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| ScanError::from_io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ScanError::from_io(dir, e))?.path();

        if !path.is_file() {
            tracing::debug!("Skipping non-file entry {}", path.display());
            continue;
        }

        files.push(path);
    }

    files.sort();

    Ok(files)
}
