//! Error types for component registration and rendering.
//!
//! [`ComponentError`] is the single error type returned by the registrar, the
//! render entry points, the preview loader and the snapshot generator. It hides
//! the underlying engine's error type so callers only match on our variants.

use std::io;
use std::path::PathBuf;

/// Errors raised while registering, resolving or rendering components.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// The requested name does not resolve under any registered namespace.
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },

    /// The engine rejected the template or its context.
    #[error("failed to render {name}: {message}")]
    Render { name: String, message: String },

    /// A namespace label is already bound to a different source.
    #[error("namespace @{namespace} is bound to {existing}, cannot rebind to {requested}")]
    NamespaceConflict {
        namespace: String,
        existing: String,
        requested: String,
    },

    /// A namespace label is empty or contains a path separator.
    #[error("invalid namespace label {namespace:?}")]
    InvalidNamespace { namespace: String },

    /// A registered directory does not exist or is not a directory.
    #[error("template directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Filesystem access failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A preview definition could not be parsed.
    #[error("invalid preview file {}: {message}", path.display())]
    Preview { path: PathBuf, message: String },
}

impl ComponentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::TemplateNotFound { name: name.into() }
    }

    /// Returns true for [`ComponentError::TemplateNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TemplateNotFound { .. })
    }

    /// Maps an engine error raised while looking `name` up.
    pub(crate) fn from_engine(name: &str, err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::TemplateNotFound => Self::not_found(name),
            _ => Self::Render {
                name: name.to_string(),
                message: engine_message(&err),
            },
        }
    }

    /// Maps an engine error raised while rendering `name`.
    ///
    /// A missing include inside a template that did resolve is a render
    /// failure of that template, not a lookup failure.
    pub(crate) fn render_failure(name: &str, err: minijinja::Error) -> Self {
        Self::Render {
            name: name.to_string(),
            message: engine_message(&err),
        }
    }
}

/// Flattens an engine error and its causes into one line.
fn engine_message(err: &minijinja::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Result type for component operations.
pub type Result<T> = std::result::Result<T, ComponentError>;
