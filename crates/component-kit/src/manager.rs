//! Host-facing entry point for a component library.
//!
//! [`Components`] knows where a component library lives and under which
//! namespace it is exposed. Host applications call [`Components::register`]
//! once on their environment and then render components by name, either from
//! Rust or from their own templates:
//!
//! ```jinja
//! {% include "@components/alert/alert.jinja" %}
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::environment::ComponentEnvironment;
use crate::error::Result;

/// Directory the component library is read from when none is given.
pub const DEFAULT_COMPONENTS_DIR: &str = "components";

/// Namespace components are registered under when none is given.
pub const DEFAULT_NAMESPACE: &str = "components";

/// A component library bound to a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components {
    path: PathBuf,
    namespace: String,
}

impl Default for Components {
    fn default() -> Self {
        Self::new(DEFAULT_COMPONENTS_DIR)
    }
}

impl Components {
    /// Creates a library rooted at `path`, exposed as `@components`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Exposes the library under a different namespace label.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registers the library with `env`.
    pub fn register(&self, env: &mut ComponentEnvironment) -> Result<()> {
        env.register(&self.path, &self.namespace)
    }

    /// Renders a component (e.g. `alert/alert`) with `params`.
    pub fn render<S: Serialize>(
        &self,
        env: &ComponentEnvironment,
        component: &str,
        params: &S,
    ) -> Result<String> {
        env.render(&self.namespace, component, params)
    }

    /// Renders a component, substituting an error block when rendering fails.
    ///
    /// Preview tools use this so one broken component does not blank the page.
    pub fn render_or_fallback<S: Serialize>(
        &self,
        env: &ComponentEnvironment,
        component: &str,
        params: &S,
    ) -> String {
        match self.render(env, component, params) {
            Ok(html) => html,
            Err(err) => {
                tracing::error!(component, error = %err, "error rendering component");
                fallback_html(&err.to_string())
            }
        }
    }
}

/// The markup shown in place of a component that failed to render.
pub fn fallback_html(message: &str) -> String {
    format!(
        "<div class=\"error\">Error rendering template: {}</div>",
        escape_html(message)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentOptions;
    use serde_json::json;
    use tempfile::TempDir;

    fn library() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("badge")).unwrap();
        std::fs::write(dir.path().join("badge/badge.jinja"), "<span>{{ label }}</span>").unwrap();
        dir
    }

    #[test]
    fn test_defaults() {
        let components = Components::default();
        assert_eq!(components.path(), Path::new("components"));
        assert_eq!(components.namespace(), "components");
    }

    #[test]
    fn test_register_and_render() {
        let dir = library();
        let components = Components::new(dir.path());
        let mut env = ComponentEnvironment::new(EnvironmentOptions::default());
        components.register(&mut env).unwrap();

        let html = components
            .render(&env, "badge/badge", &json!({"label": "new"}))
            .unwrap();
        assert_eq!(html, "<span>new</span>");
    }

    #[test]
    fn test_custom_namespace() {
        let dir = library();
        let components = Components::new(dir.path()).with_namespace("ui");
        let mut env = ComponentEnvironment::new(EnvironmentOptions::default());
        components.register(&mut env).unwrap();

        assert_eq!(env.namespaces(), vec!["ui".to_string()]);
        let html = env
            .render_path("@ui/badge/badge.jinja", &json!({"label": "x"}))
            .unwrap();
        assert_eq!(html, "<span>x</span>");
    }

    #[test]
    fn test_render_or_fallback() {
        let dir = library();
        let components = Components::new(dir.path());
        let mut env = ComponentEnvironment::new(EnvironmentOptions::default());
        components.register(&mut env).unwrap();

        let html = components.render_or_fallback(&env, "missing/missing", &json!({}));
        assert!(html.starts_with("<div class=\"error\">Error rendering template: "));
        assert!(html.contains("missing/missing.jinja"));
    }

    #[test]
    fn test_fallback_escapes_message() {
        assert_eq!(
            fallback_html("<b>"),
            "<div class=\"error\">Error rendering template: &lt;b&gt;</div>"
        );
    }
}
