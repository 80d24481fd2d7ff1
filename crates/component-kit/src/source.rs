//! Template sources: where a namespace's templates come from.
//!
//! A [`TemplateSource`] resolves a name relative to its namespace (for example
//! `alert/alert.jinja`) into a [`ResolvedTemplate`]. Two strategies ship here:
//!
//! | Source | Backing | Used for |
//! |--------|---------|----------|
//! | [`FilesystemSource`] | a directory on disk | component libraries |
//! | [`MemorySource`] | a name → content map | tests, embedded templates |
//!
//! Names are always `/`-separated. Absolute names, names with `..` segments and
//! symlinks leading out of a filesystem root never resolve.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ComponentError, Result};

/// How a resolved template's content is stored or accessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTemplate {
    /// Content held in memory.
    Inline(String),

    /// Content read from disk on demand.
    File(PathBuf),
}

impl ResolvedTemplate {
    /// Returns the template content, reading from disk for file templates.
    pub fn content(&self) -> Result<String> {
        match self {
            ResolvedTemplate::Inline(content) => Ok(content.clone()),
            ResolvedTemplate::File(path) => {
                std::fs::read_to_string(path).map_err(|e| ComponentError::io(path, e))
            }
        }
    }

    /// Returns the backing path for file templates.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ResolvedTemplate::Inline(_) => None,
            ResolvedTemplate::File(path) => Some(path),
        }
    }
}

/// A strategy for resolving template names within one namespace.
pub trait TemplateSource: Send + Sync + fmt::Debug {
    /// Resolves a namespace-relative name.
    ///
    /// Returns `Ok(None)` when the name is unknown to this source.
    fn resolve(&self, name: &str) -> Result<Option<ResolvedTemplate>>;

    /// Human-readable location, used in conflict and log messages.
    fn location(&self) -> String;

    /// The directory backing this source, if any.
    ///
    /// Registration compares directories to decide whether rebinding a
    /// namespace is a no-op.
    fn root(&self) -> Option<&Path> {
        None
    }
}

/// Templates read from a directory, re-read on every resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    /// Creates a source rooted at `root`.
    ///
    /// The directory is canonicalized so that different spellings of the same
    /// path compare equal.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::DirectoryNotFound`] if `root` is missing or is
    /// not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ComponentError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        let root = root
            .canonicalize()
            .map_err(|e| ComponentError::io(root, e))?;
        Ok(Self { root })
    }
}

impl TemplateSource for FilesystemSource {
    fn resolve(&self, name: &str) -> Result<Option<ResolvedTemplate>> {
        let Some(path) = safe_join(&self.root, name) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        // a symlink inside the root may still point outside it
        let real = path.canonicalize().map_err(|e| ComponentError::io(&path, e))?;
        if !real.starts_with(&self.root) {
            tracing::debug!(name, target = %real.display(), "template resolves outside its root");
            return Ok(None);
        }
        Ok(Some(ResolvedTemplate::File(path)))
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn root(&self) -> Option<&Path> {
        Some(&self.root)
    }
}

/// Templates held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, builder style.
    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.templates.insert(name.into(), content.into());
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateSource for MemorySource {
    fn resolve(&self, name: &str) -> Result<Option<ResolvedTemplate>> {
        Ok(self
            .templates
            .get(name)
            .map(|content| ResolvedTemplate::Inline(content.clone())))
    }

    fn location(&self) -> String {
        format!("<memory: {} templates>", self.templates.len())
    }
}

/// Joins a `/`-separated relative name onto `root`, refusing to escape it.
fn safe_join(root: &Path, name: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in name.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || Path::new(s).is_absolute() => return None,
            s => path.push(s),
        }
    }
    if name.starts_with('/') {
        return None;
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filesystem_source_resolves_nested_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("alert")).unwrap();
        std::fs::write(dir.path().join("alert/alert.jinja"), "{{ message }}").unwrap();

        let source = FilesystemSource::new(dir.path()).unwrap();
        let resolved = source.resolve("alert/alert.jinja").unwrap().unwrap();

        assert!(resolved.path().unwrap().ends_with("alert/alert.jinja"));
        assert_eq!(resolved.content().unwrap(), "{{ message }}");
    }

    #[test]
    fn test_filesystem_source_unknown_name() {
        let dir = TempDir::new().unwrap();
        let source = FilesystemSource::new(dir.path()).unwrap();
        assert!(source.resolve("nope.jinja").unwrap().is_none());
    }

    #[test]
    fn test_filesystem_source_rejects_parent_segments() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("inner")).unwrap();
        std::fs::write(dir.path().join("secret.jinja"), "secret").unwrap();

        let source = FilesystemSource::new(dir.path().join("inner")).unwrap();
        assert!(source.resolve("../secret.jinja").unwrap().is_none());
        assert!(source.resolve("/etc/passwd").unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_filesystem_source_rejects_symlink_out_of_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("inner")).unwrap();
        std::fs::write(dir.path().join("secret.jinja"), "secret").unwrap();
        std::fs::write(dir.path().join("inner/own.jinja"), "own").unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("secret.jinja"),
            dir.path().join("inner/leak.jinja"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("inner/own.jinja"),
            dir.path().join("inner/alias.jinja"),
        )
        .unwrap();

        let source = FilesystemSource::new(dir.path().join("inner")).unwrap();
        assert!(source.resolve("leak.jinja").unwrap().is_none());
        assert_eq!(source.resolve("alias.jinja").unwrap().unwrap().content().unwrap(), "own");
    }

    #[test]
    fn test_filesystem_source_missing_dir() {
        let dir = TempDir::new().unwrap();
        let err = FilesystemSource::new(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ComponentError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_filesystem_source_canonical_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();

        let direct = FilesystemSource::new(dir.path().join("a")).unwrap();
        let dotted = FilesystemSource::new(dir.path().join("a/./")).unwrap();
        assert_eq!(direct, dotted);
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with("alert/alert.jinja", "hi");
        assert_eq!(source.len(), 1);
        assert_eq!(
            source.resolve("alert/alert.jinja").unwrap(),
            Some(ResolvedTemplate::Inline("hi".into()))
        );
        assert!(source.resolve("other.jinja").unwrap().is_none());
    }
}
