//! Placeholder snapshots of component templates.
//!
//! A snapshot is a variable-free HTML skeleton of a component, written beside
//! its template for documentation and diffing:
//!
//! ```text
//! components/alert/alert.jinja        (source)
//! components/alert/alert.template.html  (snapshot)
//! ```
//!
//! For each template under the root, the generator:
//!
//! 1. extracts placeholder names with two regex scans ([`extract_placeholders`]),
//! 2. adds the baseline fields ([`BASELINE_FIELDS`]),
//! 3. renders the template with every name bound to `""`,
//! 4. cleans the output ([`clean_output`]),
//! 5. writes it to `<stem>.template.html`, overwriting any previous snapshot.
//!
//! A template that fails to render is logged and skipped; the run continues.
//! Undefined names render empty, so a name the scans missed shows up as a gap
//! in the snapshot rather than an error.
//!
//! ```rust,no_run
//! use component_kit::snapshot::{SnapshotConfig, SnapshotGenerator};
//!
//! let generator = SnapshotGenerator::new(SnapshotConfig::new("components"))?;
//! let report = generator.run()?;
//! println!("{} written, {} failed", report.written_count(), report.failed_count());
//! # Ok::<(), component_kit::ComponentError>(())
//! ```

mod cleanup;
mod extract;
mod generator;
mod walk;

pub use cleanup::clean_output;
pub use extract::{extract_placeholders, PlaceholderSet, BASELINE_FIELDS};
pub use generator::{
    snapshot_path, SnapshotConfig, SnapshotEntry, SnapshotGenerator, SnapshotReport,
    SnapshotState, SNAPSHOT_EXTENSION,
};
pub use walk::discover_templates;
