//! Render adapter between preview definitions and the environment.

use serde_json::{Map, Value};

use super::types::ComponentPreview;
use crate::environment::ComponentEnvironment;
use crate::error::{ComponentError, Result};
use crate::manager::{fallback_html, DEFAULT_NAMESPACE};

/// Renders preview stories through a [`ComponentEnvironment`].
#[derive(Debug, Clone, Copy)]
pub struct PreviewRenderer<'a> {
    env: &'a ComponentEnvironment,
    namespace: &'a str,
}

impl<'a> PreviewRenderer<'a> {
    /// Renders components from the default `components` namespace.
    pub fn new(env: &'a ComponentEnvironment) -> Self {
        Self {
            env,
            namespace: DEFAULT_NAMESPACE,
        }
    }

    pub fn with_namespace(mut self, namespace: &'a str) -> Self {
        self.namespace = namespace;
        self
    }

    /// Renders the component with explicit arguments.
    pub fn render_args(
        &self,
        preview: &ComponentPreview,
        args: &Map<String, Value>,
    ) -> Result<String> {
        self.env.render(self.namespace, &preview.component, args)
    }

    /// Renders one story by name.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::TemplateNotFound`] naming the story when the
    /// preview has no such story.
    pub fn render_story(&self, preview: &ComponentPreview, story: &str) -> Result<String> {
        let story = preview.story(story).ok_or_else(|| {
            ComponentError::not_found(format!("{} / {story}", preview.title))
        })?;
        self.render_args(preview, &preview.story_args(story))
    }

    /// Renders one story, substituting an error block on failure.
    pub fn render_story_or_fallback(&self, preview: &ComponentPreview, story: &str) -> String {
        self.render_story(preview, story).unwrap_or_else(|err| {
            tracing::error!(title = %preview.title, story, error = %err, "error rendering story");
            fallback_html(&err.to_string())
        })
    }

    /// Renders every story of a preview, in declaration order.
    pub fn render_all(&self, preview: &ComponentPreview) -> Vec<(String, Result<String>)> {
        preview
            .stories
            .iter()
            .map(|story| {
                let html = self.render_args(preview, &preview.story_args(story));
                (story.name.clone(), html)
            })
            .collect()
    }
}
