//! Component preview bindings.
//!
//! A preview describes how a component-browser tool should present a
//! component: which arguments it takes, the control used to edit each one,
//! their defaults, and a list of named example parameter sets ("stories").
//! Previews are plain data, kept next to the component as
//! `<name>.preview.yaml`:
//!
//! ```yaml
//! title: Components/Alert
//! component: alert/alert
//! args:
//!   type:
//!     control: select
//!     options: [info, warning, error]
//!     description: The type of alert
//!     default: info
//!   message:
//!     control: text
//!     default: This is an alert message
//! stories:
//!   - name: Warning
//!     args:
//!       type: warning
//!       message: This is a warning message
//! ```
//!
//! [`PreviewRenderer`] renders stories through a [`ComponentEnvironment`],
//! with a story's args laid over the declared defaults.
//!
//! [`ComponentEnvironment`]: crate::ComponentEnvironment

mod catalog;
mod render;
mod types;

pub use catalog::{PreviewCatalog, PreviewEntry, PREVIEW_EXTENSION};
pub use render::PreviewRenderer;
pub use types::{ArgSpec, ComponentPreview, Control, PreviewIssue, Story};
