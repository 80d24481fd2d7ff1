//! Template discovery.

use std::path::{Path, PathBuf};

use crate::error::{ComponentError, Result};

/// Finds every file under `root` whose name ends with `extension`.
///
/// The walk is recursive and does not follow symbolic links. Results are sorted
/// so that runs over the same tree process files in the same order.
///
/// # Errors
///
/// Returns [`ComponentError::DirectoryNotFound`] if `root` is not a directory,
/// or an I/O error if a directory cannot be read.
pub fn discover_templates(root: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(ComponentError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    walk_recursive(root, extension, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_recursive(current: &Path, extension: &str, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(current).map_err(|e| ComponentError::io(current, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| ComponentError::io(current, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| ComponentError::io(&path, e))?;

        if file_type.is_dir() {
            walk_recursive(&path, extension, files)?;
        } else if file_type.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.len() > extension.len() && name.ends_with(extension))
}
