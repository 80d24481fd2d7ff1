//! Namespaced template environment.
//!
//! [`ComponentEnvironment`] wraps a MiniJinja [`Environment`] and teaches its
//! loader about namespaces: a template path of the form
//! `@<namespace>/<relative path>` resolves through the [`TemplateSource`] bound
//! to `<namespace>`. Un-prefixed paths resolve against the optional default
//! directory.
//!
//! ```text
//! @components/alert/alert.jinja
//! ^^^^^^^^^^^ ^^^^^^^^^^^^^^^^^
//! namespace   name inside the namespace's source
//! ```
//!
//! The namespaced loader is installed lazily, the first time something is
//! registered. A host environment passed to
//! [`ComponentEnvironment::from_environment`] keeps its own loader until then;
//! registration replaces it.
//!
//! # Caching
//!
//! Caching is an [`EnvironmentOptions`] setting of each environment. With
//! caching on, compiled templates are kept by the engine. With caching off, a
//! component's source is resolved and compiled again on every render, so edits
//! on disk are visible immediately.
//!
//! # Example
//!
//! ```rust,no_run
//! use component_kit::{ComponentEnvironment, EnvironmentOptions};
//! use serde_json::json;
//!
//! let mut env = ComponentEnvironment::new(EnvironmentOptions::default());
//! env.register("./components", "components")?;
//!
//! let html = env.render("components", "alert/alert", &json!({
//!     "type": "warning",
//!     "message": "This is a warning message",
//! }))?;
//! # Ok::<(), component_kit::ComponentError>(())
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior, Value};
use serde::Serialize;

use crate::error::{ComponentError, Result};
use crate::source::{FilesystemSource, ResolvedTemplate, TemplateSource};

/// File extension of component templates.
pub const TEMPLATE_EXTENSION: &str = ".jinja";

/// Marks a namespaced template path (`@namespace/name`).
pub const NAMESPACE_PREFIX: char = '@';

/// Per-environment configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentOptions {
    /// Keep compiled component templates between renders.
    pub cache: bool,
    /// Extension appended to component names by [`ComponentEnvironment::render`].
    pub extension: String,
    /// Fail on undefined variables instead of rendering them empty.
    pub strict_undefined: bool,
    /// HTML-escape interpolated values in every template.
    pub auto_escape: bool,
}

impl Default for EnvironmentOptions {
    fn default() -> Self {
        Self {
            cache: true,
            extension: TEMPLATE_EXTENSION.to_string(),
            strict_undefined: false,
            auto_escape: true,
        }
    }
}

impl EnvironmentOptions {
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_strict_undefined(mut self, strict: bool) -> Self {
        self.strict_undefined = strict;
        self
    }

    pub fn with_auto_escape(mut self, auto_escape: bool) -> Self {
        self.auto_escape = auto_escape;
        self
    }
}

/// Namespace label → source bindings, shared with the engine's loader.
#[derive(Debug, Default)]
struct NamespaceTable {
    namespaces: HashMap<String, Box<dyn TemplateSource>>,
    default: Option<Box<dyn TemplateSource>>,
}

impl NamespaceTable {
    fn resolve_path(&self, path: &str) -> Result<Option<ResolvedTemplate>> {
        match split_namespaced(path) {
            Some((namespace, name)) => match self.namespaces.get(namespace) {
                Some(source) => source.resolve(name),
                None => Ok(None),
            },
            None if path.starts_with(NAMESPACE_PREFIX) => Ok(None),
            None => match &self.default {
                Some(source) => source.resolve(path),
                None => Ok(None),
            },
        }
    }
}

/// Splits `@namespace/name` into its two parts.
///
/// Returns `None` for un-prefixed paths and for a bare `@namespace`.
pub fn split_namespaced(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix(NAMESPACE_PREFIX)?;
    let (namespace, name) = rest.split_once('/')?;
    if namespace.is_empty() || name.is_empty() {
        return None;
    }
    Some((namespace, name))
}

/// Builds the loader path for a component: `@<namespace>/<component><ext>`.
///
/// A component name that already carries the extension is used as is.
pub fn component_path(namespace: &str, component: &str, extension: &str) -> String {
    let component = component.trim_start_matches('/');
    if component.ends_with(extension) {
        format!("{NAMESPACE_PREFIX}{namespace}/{component}")
    } else {
        format!("{NAMESPACE_PREFIX}{namespace}/{component}{extension}")
    }
}

fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty()
        || namespace.contains('/')
        || namespace.starts_with(NAMESPACE_PREFIX)
        || namespace.chars().any(char::is_whitespace)
    {
        return Err(ComponentError::InvalidNamespace {
            namespace: namespace.to_string(),
        });
    }
    Ok(())
}

/// A MiniJinja environment with namespaced component sources.
pub struct ComponentEnvironment {
    env: Environment<'static>,
    table: Arc<RwLock<NamespaceTable>>,
    namespaced_loader: bool,
    options: EnvironmentOptions,
}

impl ComponentEnvironment {
    /// Creates an environment with no sources registered.
    pub fn new(options: EnvironmentOptions) -> Self {
        Self::from_environment(Environment::new(), options)
    }

    /// Wraps an environment configured by the host application.
    ///
    /// Filters, globals and templates already added to `env` stay available.
    /// A loader set on `env` is replaced on the first registration. The
    /// undefined and auto-escape settings of `options` are applied to `env`.
    pub fn from_environment(mut env: Environment<'static>, options: EnvironmentOptions) -> Self {
        if options.strict_undefined {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }
        if options.auto_escape {
            env.set_auto_escape_callback(|_| AutoEscape::Html);
        }
        Self {
            env,
            table: Arc::new(RwLock::new(NamespaceTable::default())),
            namespaced_loader: false,
            options,
        }
    }

    pub fn options(&self) -> &EnvironmentOptions {
        &self.options
    }

    /// Returns the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns the underlying MiniJinja environment mutably, for registering
    /// filters and globals.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Whether the namespaced loader has been installed.
    pub fn supports_namespaces(&self) -> bool {
        self.namespaced_loader
    }

    /// Binds a directory of templates to `namespace`.
    ///
    /// Registering the same directory under the same label again is a no-op.
    /// Paths are compared after canonicalization.
    ///
    /// # Errors
    ///
    /// - [`ComponentError::DirectoryNotFound`] if `dir` is not a directory
    /// - [`ComponentError::NamespaceConflict`] if `namespace` is bound to a
    ///   different source
    /// - [`ComponentError::InvalidNamespace`] for an empty or malformed label
    pub fn register(&mut self, dir: impl AsRef<Path>, namespace: &str) -> Result<()> {
        validate_namespace(namespace)?;
        let source = FilesystemSource::new(dir)?;
        self.ensure_namespaced_loader();

        let mut table = self.write_table();
        if let Some(existing) = table.namespaces.get(namespace) {
            if existing.root().is_some() && existing.root() == source.root() {
                tracing::debug!(
                    namespace,
                    path = %source.location(),
                    "namespace already registered"
                );
                return Ok(());
            }
            return Err(ComponentError::NamespaceConflict {
                namespace: namespace.to_string(),
                existing: existing.location(),
                requested: source.location(),
            });
        }

        tracing::debug!(namespace, path = %source.location(), "registered template namespace");
        table
            .namespaces
            .insert(namespace.to_string(), Box::new(source));
        Ok(())
    }

    /// Binds an arbitrary resolution strategy to `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::NamespaceConflict`] if the label is taken.
    pub fn register_source(
        &mut self,
        namespace: &str,
        source: impl TemplateSource + 'static,
    ) -> Result<()> {
        validate_namespace(namespace)?;
        self.ensure_namespaced_loader();

        let mut table = self.write_table();
        if let Some(existing) = table.namespaces.get(namespace) {
            return Err(ComponentError::NamespaceConflict {
                namespace: namespace.to_string(),
                existing: existing.location(),
                requested: source.location(),
            });
        }
        tracing::debug!(namespace, source = %source.location(), "registered template namespace");
        table
            .namespaces
            .insert(namespace.to_string(), Box::new(source));
        Ok(())
    }

    /// Sets the directory that un-prefixed template paths resolve against.
    pub fn set_default_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let source = FilesystemSource::new(dir)?;
        self.ensure_namespaced_loader();
        self.write_table().default = Some(Box::new(source));
        Ok(())
    }

    /// Returns the registered namespace labels, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_table().namespaces.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolves a component to its template without rendering it.
    pub fn resolve(&self, namespace: &str, component: &str) -> Result<ResolvedTemplate> {
        let path = component_path(namespace, component, &self.options.extension);
        self.resolve_path(&path)?
            .ok_or_else(|| ComponentError::not_found(path))
    }

    /// Resolves any loader path (`@namespace/name` or un-prefixed).
    pub fn resolve_path(&self, path: &str) -> Result<Option<ResolvedTemplate>> {
        self.read_table().resolve_path(path)
    }

    /// Renders `@<namespace>/<component><ext>` with `params`.
    ///
    /// # Errors
    ///
    /// - [`ComponentError::TemplateNotFound`] if the component does not resolve
    /// - [`ComponentError::Render`] if the engine rejects template or context
    pub fn render<S: Serialize>(
        &self,
        namespace: &str,
        component: &str,
        params: &S,
    ) -> Result<String> {
        let path = component_path(namespace, component, &self.options.extension);
        self.render_path(&path, params)
    }

    /// Renders the template at a loader path.
    pub fn render_path<S: Serialize>(&self, path: &str, params: &S) -> Result<String> {
        let ctx = Value::from_serialize(params);

        if !self.options.cache {
            if let Some(resolved) = self.resolve_path(path)? {
                let source = resolved.content()?;
                return self.render_source(path, &source, ctx);
            }
        }

        let template = self
            .env
            .get_template(path)
            .map_err(|e| ComponentError::from_engine(path, e))?;
        template
            .render(ctx)
            .map_err(|e| ComponentError::render_failure(path, e))
    }

    /// Compiles and renders `source` under `name` without caching it.
    ///
    /// Includes inside `source` still resolve through the namespaced loader.
    pub fn render_source<S: Serialize>(&self, name: &str, source: &str, ctx: S) -> Result<String> {
        self.env
            .render_named_str(name, source, ctx)
            .map_err(|e| ComponentError::render_failure(name, e))
    }

    /// Drops every template the engine has compiled so far.
    pub fn clear_cache(&mut self) {
        self.env.clear_templates();
    }

    fn ensure_namespaced_loader(&mut self) {
        if self.namespaced_loader {
            return;
        }
        tracing::debug!("installing namespaced template loader");
        let table = Arc::clone(&self.table);
        self.env.set_loader(move |name| load(&table, name));
        self.namespaced_loader = true;
    }

    fn read_table(&self) -> RwLockReadGuard<'_, NamespaceTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, NamespaceTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ComponentEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentEnvironment")
            .field("namespaces", &self.namespaces())
            .field("namespaced_loader", &self.namespaced_loader)
            .field("options", &self.options)
            .finish()
    }
}

/// Loader callback: resolves a path through the namespace table.
fn load(
    table: &RwLock<NamespaceTable>,
    name: &str,
) -> std::result::Result<Option<String>, minijinja::Error> {
    let table = table.read().unwrap_or_else(PoisonError::into_inner);
    let resolved = table.resolve_path(name).map_err(loader_error)?;
    match resolved {
        Some(template) => template.content().map(Some).map_err(loader_error),
        None => Ok(None),
    }
}

fn loader_error(err: ComponentError) -> minijinja::Error {
    minijinja::Error::new(ErrorKind::InvalidOperation, "could not load template").with_source(err)
}
