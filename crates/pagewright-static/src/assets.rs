//! Static asset copying.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Errors that can occur while copying static assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Static directory not found: {0}")]
    MissingSource(PathBuf),

    #[error("Failed to walk static directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to copy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Recursively copy `source` into `dest`, overwriting existing files.
///
/// `dest` and any missing parents are created. Returns the number of files
/// copied.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<usize, AssetError> {
    if !source.is_dir() {
        return Err(AssetError::MissingSource(source.to_path_buf()));
    }

    create_dir(dest)?;

    let mut copied = 0;

    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            create_dir(&target)?;
            continue;
        }

        fs::copy(entry.path(), &target).map_err(|e| AssetError::Io {
            path: entry.path().to_path_buf(),
            source: e,
        })?;
        tracing::debug!("Copied {}", relative.display());
        copied += 1;
    }

    Ok(copied)
}

fn create_dir(path: &Path) -> Result<(), AssetError> {
    fs::create_dir_all(path).map_err(|e| AssetError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_nested_tree() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("static");
        let dest = temp.path().join("out").join("static");

        fs::create_dir_all(src.join("css")).unwrap();
        fs::write(src.join("favicon.ico"), "icon").unwrap();
        fs::write(src.join("css").join("style.css"), "body {}").unwrap();

        let copied = copy_tree(&src, &dest).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dest.join("favicon.ico")).unwrap(), "icon");
        assert_eq!(
            fs::read_to_string(dest.join("css").join("style.css")).unwrap(),
            "body {}"
        );
    }

    #[test]
    fn overwrites_existing_files() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("static");
        let dest = temp.path().join("dest");

        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(src.join("app.js"), "new").unwrap();
        fs::write(dest.join("app.js"), "old").unwrap();
        fs::write(dest.join("keep.txt"), "untouched").unwrap();

        copy_tree(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("app.js")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dest.join("keep.txt")).unwrap(), "untouched");
    }

    #[test]
    fn copies_empty_directories() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("static");
        let dest = temp.path().join("dest");

        fs::create_dir_all(src.join("img")).unwrap();

        let copied = copy_tree(&src, &dest).unwrap();

        assert_eq!(copied, 0);
        assert!(dest.join("img").is_dir());
    }

    #[test]
    fn missing_source_is_an_error() {
        let temp = tempdir().unwrap();

        let result = copy_tree(&temp.path().join("static"), &temp.path().join("dest"));

        assert!(matches!(result, Err(AssetError::MissingSource(_))));
    }
}
