//! Discovery of preview definitions in a component library.

use std::path::{Path, PathBuf};

use super::types::ComponentPreview;
use crate::error::Result;
use crate::snapshot::discover_templates;

/// Extension of preview definition files.
pub const PREVIEW_EXTENSION: &str = ".preview.yaml";

/// A preview definition together with the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewEntry {
    pub path: PathBuf,
    pub preview: ComponentPreview,
}

/// All preview definitions of a component library, sorted by title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewCatalog {
    entries: Vec<PreviewEntry>,
}

impl PreviewCatalog {
    /// Loads every `*.preview.yaml` under `root`.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be read or parsed.
    pub fn load_dir(root: impl AsRef<Path>) -> Result<Self> {
        let mut entries = Vec::new();
        for path in discover_templates(root, PREVIEW_EXTENSION)? {
            let preview = ComponentPreview::from_file(&path)?;
            tracing::debug!(path = %path.display(), title = %preview.title, "loaded preview");
            entries.push(PreviewEntry { path, preview });
        }
        entries.sort_by(|a, b| a.preview.title.cmp(&b.preview.title));
        Ok(Self { entries })
    }

    /// Adds a preview defined in code.
    pub fn insert(&mut self, path: impl Into<PathBuf>, preview: ComponentPreview) {
        self.entries.push(PreviewEntry {
            path: path.into(),
            preview,
        });
        self.entries
            .sort_by(|a, b| a.preview.title.cmp(&b.preview.title));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PreviewEntry> {
        self.entries.iter()
    }

    /// Finds a preview by title.
    pub fn get(&self, title: &str) -> Option<&ComponentPreview> {
        self.entries
            .iter()
            .map(|entry| &entry.preview)
            .find(|preview| preview.title == title)
    }

    /// Finds the preview for a component name.
    pub fn for_component(&self, component: &str) -> Option<&ComponentPreview> {
        self.entries
            .iter()
            .map(|entry| &entry.preview)
            .find(|preview| preview.component == component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComponentError;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_dir_sorted_by_title() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "zeta/zeta.preview.yaml",
            "title: Components/Zeta\ncomponent: zeta/zeta\n",
        );
        write(
            dir.path(),
            "alert/alert.preview.yaml",
            "title: Components/Alert\ncomponent: alert/alert\n",
        );
        write(dir.path(), "alert/alert.jinja", "{{ message }}");

        let catalog = PreviewCatalog::load_dir(dir.path()).unwrap();
        let titles: Vec<&str> = catalog.iter().map(|e| e.preview.title.as_str()).collect();
        assert_eq!(titles, vec!["Components/Alert", "Components/Zeta"]);
        assert!(catalog.for_component("zeta/zeta").is_some());
        assert!(catalog.get("Components/Alert").is_some());
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bad/bad.preview.yaml", "title: [unclosed");

        let err = PreviewCatalog::load_dir(dir.path()).unwrap_err();
        match err {
            ComponentError::Preview { path, .. } => assert!(path.ends_with("bad/bad.preview.yaml")),
            other => panic!("expected preview error, got {other:?}"),
        }
    }
}
