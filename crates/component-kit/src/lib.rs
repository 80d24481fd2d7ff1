//! # Component Kit - Namespaced Component Templates
//!
//! `component-kit` lets a library of HTML component templates be registered in a
//! MiniJinja environment under a namespace, rendered by name, described for a
//! component-browser tool, and snapshotted into placeholder HTML.
//!
//! ## Core Concepts
//!
//! - [`ComponentEnvironment`]: MiniJinja environment whose loader understands
//!   `@namespace/name` paths
//! - [`TemplateSource`]: how a namespace resolves names ([`FilesystemSource`],
//!   [`MemorySource`])
//! - [`Components`]: a component library bound to a namespace, as a host
//!   application uses it
//! - [`preview`]: argument metadata and example stories for preview tools
//! - [`snapshot`]: placeholder snapshot generation
//!
//! ## Quick Start
//!
//! ```rust
//! use component_kit::{ComponentEnvironment, EnvironmentOptions, MemorySource};
//! use serde_json::json;
//!
//! let mut env = ComponentEnvironment::new(EnvironmentOptions::default());
//! env.register_source(
//!     "components",
//!     MemorySource::new().with(
//!         "alert/alert.jinja",
//!         r#"<div class="alert alert-{{ type }}">{{ message }}</div>"#,
//!     ),
//! )?;
//!
//! let html = env.render("components", "alert/alert", &json!({
//!     "type": "warning",
//!     "message": "This is a warning message",
//! }))?;
//! assert_eq!(html, r#"<div class="alert alert-warning">This is a warning message</div>"#);
//! # Ok::<(), component_kit::ComponentError>(())
//! ```
//!
//! ## From Host Templates
//!
//! Once registered, components can be included from any template rendered by
//! the same environment:
//!
//! ```jinja
//! {% include "@components/alert/alert.jinja" %}
//! ```

pub mod environment;
mod error;
pub mod manager;
pub mod preview;
pub mod snapshot;
pub mod source;

pub use environment::{
    component_path, split_namespaced, ComponentEnvironment, EnvironmentOptions, NAMESPACE_PREFIX,
    TEMPLATE_EXTENSION,
};
pub use error::{ComponentError, Result};
pub use manager::{fallback_html, Components, DEFAULT_COMPONENTS_DIR, DEFAULT_NAMESPACE};
pub use source::{FilesystemSource, MemorySource, ResolvedTemplate, TemplateSource};
