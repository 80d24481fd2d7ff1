//! The batch snapshot run.

use std::fmt;
use std::path::{Path, PathBuf};

use minijinja::UndefinedBehavior;

use super::cleanup::clean_output;
use super::extract::{extract_placeholders, PlaceholderSet, BASELINE_FIELDS};
use super::walk::discover_templates;
use crate::environment::{
    ComponentEnvironment, EnvironmentOptions, NAMESPACE_PREFIX, TEMPLATE_EXTENSION,
};
use crate::error::{ComponentError, Result};
use crate::manager::{DEFAULT_COMPONENTS_DIR, DEFAULT_NAMESPACE};

/// Double extension given to generated snapshots.
pub const SNAPSHOT_EXTENSION: &str = ".template.html";

/// Settings for a snapshot run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Directory tree to scan.
    pub root: PathBuf,
    /// Extension identifying template files.
    pub extension: String,
    /// Extension that replaces `extension` on the written snapshot.
    pub snapshot_extension: String,
    /// Names always bound to `""`, in addition to the extracted ones.
    pub baseline_fields: Vec<String>,
    /// Namespace the root is registered under, so templates can include
    /// siblings as `@<namespace>/...`.
    pub namespace: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_COMPONENTS_DIR),
            extension: TEMPLATE_EXTENSION.to_string(),
            snapshot_extension: SNAPSHOT_EXTENSION.to_string(),
            baseline_fields: BASELINE_FIELDS.iter().map(|f| f.to_string()).collect(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl SnapshotConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_snapshot_extension(mut self, extension: impl Into<String>) -> Self {
        self.snapshot_extension = extension.into();
        self
    }

    pub fn with_baseline_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.baseline_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

/// Where a file got to in the pipeline.
///
/// `Discovered → Extracted → Rendered → Cleaned → Written`, or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    Discovered,
    Extracted,
    Rendered,
    Cleaned,
    Written,
    Failed,
}

impl fmt::Display for SnapshotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotState::Discovered => "discovered",
            SnapshotState::Extracted => "extracted",
            SnapshotState::Rendered => "rendered",
            SnapshotState::Cleaned => "cleaned",
            SnapshotState::Written => "written",
            SnapshotState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The outcome for one template.
#[derive(Debug)]
pub struct SnapshotEntry {
    pub source: PathBuf,
    pub output: PathBuf,
    pub state: SnapshotState,
    /// Placeholders the template was rendered with. Empty if reading failed.
    pub placeholders: PlaceholderSet,
    pub error: Option<ComponentError>,
}

impl SnapshotEntry {
    pub fn is_written(&self) -> bool {
        self.state == SnapshotState::Written
    }
}

/// The outcome of a whole run.
#[derive(Debug, Default)]
pub struct SnapshotReport {
    pub entries: Vec<SnapshotEntry>,
}

impl SnapshotReport {
    /// Snapshots written, in processing order.
    pub fn written(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries.iter().filter(|e| e.is_written())
    }

    /// Templates that failed, in processing order.
    pub fn failed(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries.iter().filter(|e| !e.is_written())
    }

    pub fn written_count(&self) -> usize {
        self.written().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// True when every discovered template was written.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Returns the snapshot path for a template: `alert.jinja` → `alert.template.html`.
pub fn snapshot_path(template: &Path, extension: &str, snapshot_extension: &str) -> PathBuf {
    let file_name = template
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(extension).unwrap_or(&file_name);
    template.with_file_name(format!("{stem}{snapshot_extension}"))
}

/// Renders every template under a root into a placeholder snapshot.
#[derive(Debug)]
pub struct SnapshotGenerator {
    config: SnapshotConfig,
    env: ComponentEnvironment,
}

impl SnapshotGenerator {
    /// Prepares a generator for `config.root`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::DirectoryNotFound`] if the root is missing.
    pub fn new(config: SnapshotConfig) -> Result<Self> {
        let mut env = ComponentEnvironment::new(
            EnvironmentOptions::default()
                .with_cache(false)
                .with_extension(config.extension.clone()),
        );
        // attribute access on names the scans missed renders empty too
        env.environment_mut().set_undefined_behavior(UndefinedBehavior::Chainable);
        env.register(&config.root, &config.namespace)?;
        Ok(Self { config, env })
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Lists the templates a run would process.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let files = discover_templates(&self.config.root, &self.config.extension)?;
        Ok(files
            .into_iter()
            .filter(|path| !path.to_string_lossy().ends_with(&self.config.snapshot_extension))
            .collect())
    }

    /// Processes every template under the root.
    ///
    /// A failing template is logged and recorded in the report; the run
    /// carries on with the next one.
    ///
    /// # Errors
    ///
    /// Only discovery errors abort the run.
    pub fn run(&self) -> Result<SnapshotReport> {
        tracing::info!(root = %self.config.root.display(), "generating snapshots");
        let files = self.discover()?;
        tracing::info!(count = files.len(), "found templates");

        let mut report = SnapshotReport::default();
        for path in files {
            report.entries.push(self.process_file(&path));
        }

        tracing::info!(
            written = report.written_count(),
            failed = report.failed_count(),
            "snapshot generation complete"
        );
        Ok(report)
    }

    /// Runs one template through the pipeline.
    pub fn process_file(&self, path: &Path) -> SnapshotEntry {
        tracing::info!(path = %path.display(), "processing");
        let mut entry = SnapshotEntry {
            source: path.to_path_buf(),
            output: snapshot_path(path, &self.config.extension, &self.config.snapshot_extension),
            state: SnapshotState::Discovered,
            placeholders: PlaceholderSet::new(),
            error: None,
        };

        match self.advance(&mut entry) {
            Ok(()) => {
                tracing::info!(output = %entry.output.display(), "created snapshot");
            }
            Err(err) => {
                tracing::error!(
                    path = %path.display(),
                    reached = %entry.state,
                    error = %err,
                    "error processing template"
                );
                entry.state = SnapshotState::Failed;
                entry.error = Some(err);
            }
        }
        entry
    }

    /// Renders a template to its cleaned snapshot body without writing it.
    pub fn render_snapshot(&self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path).map_err(|e| ComponentError::io(path, e))?;
        let placeholders = self.placeholders_for(&content);
        let rendered = self.render(path, &content, &placeholders)?;
        Ok(clean_output(&rendered))
    }

    fn advance(&self, entry: &mut SnapshotEntry) -> Result<()> {
        let content = std::fs::read_to_string(&entry.source)
            .map_err(|e| ComponentError::io(&entry.source, e))?;

        entry.placeholders = self.placeholders_for(&content);
        entry.state = SnapshotState::Extracted;
        tracing::debug!(
            placeholders = ?entry.placeholders.names().collect::<Vec<_>>(),
            "found placeholders"
        );

        let rendered = self.render(&entry.source, &content, &entry.placeholders)?;
        entry.state = SnapshotState::Rendered;

        let cleaned = clean_output(&rendered);
        entry.state = SnapshotState::Cleaned;

        std::fs::write(&entry.output, cleaned).map_err(|e| ComponentError::io(&entry.output, e))?;
        entry.state = SnapshotState::Written;
        Ok(())
    }

    fn placeholders_for(&self, content: &str) -> PlaceholderSet {
        extract_placeholders(content).with_baseline(&self.config.baseline_fields)
    }

    fn render(&self, path: &Path, content: &str, placeholders: &PlaceholderSet) -> Result<String> {
        let name = self.loader_name(path);
        self.env
            .render_source(&name, content, placeholders.to_context())
    }

    /// Names a template the way an include would: `@components/alert/alert.jinja`.
    fn loader_name(&self, path: &Path) -> String {
        match path.strip_prefix(&self.config.root) {
            Ok(relative) => format!(
                "{NAMESPACE_PREFIX}{}/{}",
                self.config.namespace,
                relative.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/")
            ),
            Err(_) => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            snapshot_path(Path::new("c/alert/alert.jinja"), ".jinja", ".template.html"),
            PathBuf::from("c/alert/alert.template.html")
        );
        assert_eq!(
            snapshot_path(Path::new("c/alert.v2.jinja"), ".jinja", ".template.html"),
            PathBuf::from("c/alert.v2.template.html")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = SnapshotConfig::default();
        assert_eq!(config.root, PathBuf::from("components"));
        assert_eq!(config.extension, ".jinja");
        assert_eq!(config.snapshot_extension, ".template.html");
        assert_eq!(config.baseline_fields, vec!["type", "message", "content", "title"]);
    }

    #[test]
    fn test_scenario_renders_separator_only() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "alert/alert.jinja",
            "{{ type }} — {% if dismissible %}X{% endif %}",
        );
        let generator = SnapshotGenerator::new(SnapshotConfig::new(dir.path())).unwrap();

        let entry = generator.process_file(&path);
        assert!(entry.is_written());
        let names: Vec<&str> = entry.placeholders.names().collect();
        assert_eq!(names, vec!["content", "dismissible", "message", "title", "type"]);

        let content = std::fs::read_to_string(&entry.output).unwrap();
        assert_eq!(content, " —");
    }

    #[test]
    fn test_nested_access_leaves_a_gap() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "card/card.jinja",
            "<div>{{ user.name }}{% if a.b.c %}X{% endif %}</div>",
        );
        let generator = SnapshotGenerator::new(SnapshotConfig::new(dir.path())).unwrap();

        let entry = generator.process_file(&path);
        assert!(entry.is_written(), "{:?}", entry.error);
        assert!(!entry.placeholders.contains("user"));
        assert_eq!(std::fs::read_to_string(&entry.output).unwrap(), "<div></div>");
    }

    #[test]
    fn test_render_failure_is_recorded() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "broken.jinja", "{% if %}");
        let generator = SnapshotGenerator::new(SnapshotConfig::new(dir.path())).unwrap();

        let entry = generator.process_file(&path);
        assert_eq!(entry.state, SnapshotState::Failed);
        assert!(matches!(entry.error, Some(ComponentError::Render { .. })));
        assert!(!entry.output.exists());
    }

    #[test]
    fn test_includes_resolve_through_namespace() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "partials/icon.jinja", "<i class=\"icon\"></i>");
        let path = write(
            dir.path(),
            "alert/alert.jinja",
            "<div>{% include '@components/partials/icon.jinja' %}{{ message }}</div>",
        );
        let generator = SnapshotGenerator::new(SnapshotConfig::new(dir.path())).unwrap();

        assert_eq!(
            generator.render_snapshot(&path).unwrap(),
            "<div><i class=\"icon\"></i></div>"
        );
    }

    #[test]
    fn test_snapshots_are_not_rediscovered() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/a.html", "<p>{{ title }}</p>");
        let config = SnapshotConfig::new(dir.path()).with_extension(".html");
        let generator = SnapshotGenerator::new(config).unwrap();

        let first = generator.run().unwrap();
        assert_eq!(first.written_count(), 1);
        assert!(dir.path().join("a/a.template.html").exists());

        let second = generator.run().unwrap();
        assert_eq!(second.entries.len(), 1);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let config = SnapshotConfig::new(dir.path().join("nope"));
        let err = SnapshotGenerator::new(config).unwrap_err();
        assert!(matches!(err, ComponentError::DirectoryNotFound { .. }));
    }
}
