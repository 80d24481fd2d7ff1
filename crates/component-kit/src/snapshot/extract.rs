//! Placeholder extraction.
//!
//! Two regex scans over the raw template text collect the variable names a
//! template is likely to read:
//!
//! | Scan | Matches | Captures |
//! |------|---------|----------|
//! | interpolation | `{{ name }}`, `{{ name \| upper }}`, `{{- name -}}` | `name` |
//! | conditional | `{% if name %}`, `{% elif name == "x" %}`, `{% if not name %}` | `name` |
//!
//! Names starting with `_` and the loop context name `loop` are skipped.
//!
//! This is a heuristic, not a parse of the expression grammar. Attribute access
//! (`{{ user.name }}`), calls, and loop-scoped variables are not captured; the
//! snapshot generator renders those parts empty, chained lookups included.
//! Conditionals that call a function (`{% if enabled() %}`) are skipped, since
//! binding a callee to an empty string would turn a harmless gap into a render
//! error.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

/// Field names every snapshot context carries, whether or not the scans see them.
pub const BASELINE_FIELDS: &[&str] = &["type", "message", "content", "title"];

/// Loop context name, never treated as a placeholder.
const LOOP_VARIABLE: &str = "loop";

static INTERPOLATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{-?\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:\|[^}]*?)?-?\}\}")
        .expect("interpolation pattern is valid")
});

static CONDITIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\{%-?\s*(?:if|elif)\s+(?:not\s+)?([A-Za-z_][A-Za-z0-9_]*)(\s*\()?",
        r"(?:\s*(?:==|!=|>=|<=|>|<|\bis\b|\bin\b|\bnot\s+in\b))?[^%]*%\}",
    ))
    .expect("conditional pattern is valid")
});

/// Variable names a template reads, each bound to an empty string when rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderSet {
    names: BTreeSet<String>,
}

impl PlaceholderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name. Returns false if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Adds every baseline field, builder style.
    pub fn with_baseline<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            self.insert(field.as_ref());
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The render context: every name mapped to `""`.
    pub fn to_context(&self) -> BTreeMap<&str, &'static str> {
        self.names().map(|name| (name, "")).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PlaceholderSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Scans template text for placeholder names.
///
/// Baseline fields are not added here; see [`PlaceholderSet::with_baseline`].
pub fn extract_placeholders(content: &str) -> PlaceholderSet {
    let mut set = PlaceholderSet::new();

    for caps in INTERPOLATION.captures_iter(content) {
        add_if_eligible(&mut set, &caps[1]);
    }

    for caps in CONDITIONAL.captures_iter(content) {
        if caps.get(2).is_some() {
            continue;
        }
        add_if_eligible(&mut set, &caps[1]);
    }

    set
}

fn add_if_eligible(set: &mut PlaceholderSet, name: &str) {
    if !name.starts_with('_') && name != LOOP_VARIABLE {
        set.insert(name);
    }
}
