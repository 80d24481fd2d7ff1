//! Preview definition types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ComponentError, Result};

/// The input widget a preview tool shows for an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Text,
    Boolean,
    Select,
}

/// One declared component argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub control: Control,
    /// Allowed values for [`Control::Select`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// A named example parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

/// Preview metadata for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPreview {
    /// Title shown by the preview tool, e.g. `Components/Alert`.
    pub title: String,
    /// Component name inside its namespace, e.g. `alert/alert`.
    pub component: String,
    #[serde(default)]
    pub args: BTreeMap<String, ArgSpec>,
    #[serde(default)]
    pub stories: Vec<Story>,
}

/// Something wrong with a preview definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewIssue {
    /// `args.<name>` or `stories.<story>.<arg>`.
    pub location: String,
    pub message: String,
}

impl fmt::Display for PreviewIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

impl ComponentPreview {
    /// Parses a preview from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Reads and parses a preview file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| ComponentError::io(path, e))?;
        Self::from_yaml(&yaml).map_err(|e| ComponentError::Preview {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn story(&self, name: &str) -> Option<&Story> {
        self.stories.iter().find(|story| story.name == name)
    }

    /// Declared defaults, keyed by argument name.
    pub fn defaults(&self) -> Map<String, Value> {
        self.args
            .iter()
            .filter_map(|(name, spec)| spec.default.clone().map(|value| (name.clone(), value)))
            .collect()
    }

    /// Parameters for a story: defaults, overlaid with the story's own args.
    pub fn story_args(&self, story: &Story) -> Map<String, Value> {
        let mut args = self.defaults();
        for (name, value) in &story.args {
            args.insert(name.clone(), value.clone());
        }
        args
    }

    /// Checks the definition for mistakes a preview tool would trip over.
    ///
    /// Returns an empty list when the preview is consistent.
    pub fn validate(&self) -> Vec<PreviewIssue> {
        let mut issues = Vec::new();

        for (name, spec) in &self.args {
            let location = format!("args.{name}");
            if spec.control == Control::Select && spec.options.is_empty() {
                issues.push(issue(&location, "select control has no options"));
            }
            if spec.control != Control::Select && !spec.options.is_empty() {
                issues.push(issue(&location, "options are only used by select controls"));
            }
            if let Some(default) = &spec.default {
                check_value(spec, default, &location, &mut issues);
            }
        }

        let mut seen = BTreeSet::new();
        for story in &self.stories {
            if !seen.insert(story.name.as_str()) {
                issues.push(issue(
                    &format!("stories.{}", story.name),
                    "duplicate story name",
                ));
            }
            for (name, value) in &story.args {
                let location = format!("stories.{}.{name}", story.name);
                match self.args.get(name) {
                    Some(spec) => check_value(spec, value, &location, &mut issues),
                    None => issues.push(issue(&location, "argument is not declared")),
                }
            }
        }

        issues
    }
}

fn check_value(spec: &ArgSpec, value: &Value, location: &str, issues: &mut Vec<PreviewIssue>) {
    match spec.control {
        Control::Boolean if !value.is_boolean() => {
            issues.push(issue(location, "expected a boolean"));
        }
        Control::Text if !value.is_string() => {
            issues.push(issue(location, "expected a string"));
        }
        Control::Select => match value.as_str() {
            Some(choice) if spec.options.iter().any(|option| option == choice) => {}
            _ => issues.push(issue(
                location,
                &format!("{value} is not one of [{}]", spec.options.join(", ")),
            )),
        },
        _ => {}
    }
}

fn issue(location: &str, message: &str) -> PreviewIssue {
    PreviewIssue {
        location: location.to_string(),
        message: message.to_string(),
    }
}
