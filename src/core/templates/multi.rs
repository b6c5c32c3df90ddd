//! Build-once renderer for production.

use std::collections::HashMap;

use tera::Context;
use tracing::{debug, warn};

use super::{HtmlRender, Recipe, Renderer, Template, renderer::Store};
use crate::core::{
    config::{RenderMode, RendererConfig},
    error::{Error, Result},
};

/// Template registry that builds each template once, at registration
#[derive(Debug)]
pub struct Render {
    templates: HashMap<String, Template>,
    config: RendererConfig,
}

impl Render {
    pub fn new() -> Self {
        Self::with_config(RendererConfig::with_mode(RenderMode::Release))
    }

    /// Use `config` for every build. The mode is always release.
    pub fn with_config(mut config: RendererConfig) -> Self {
        config.mode = RenderMode::Release;
        Self {
            templates: HashMap::new(),
            config,
        }
    }

    /// Built template registered under `name`
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }
}

impl Default for Render {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for Render {
    fn store(&mut self, name: &str, _recipe: Recipe, built: Template) {
        if self.templates.insert(name.to_string(), built).is_some() {
            debug!("Replaced template '{}'", name);
        }
    }
}

impl Renderer for Render {
    fn config(&self) -> &RendererConfig {
        &self.config
    }

    fn mode(&self) -> RenderMode {
        RenderMode::Release
    }

    fn instance(&self, name: &str, context: Context) -> Result<HtmlRender> {
        let template = self.templates.get(name).ok_or_else(|| {
            warn!("Template with name '{}' not found", name);
            Error::TemplateNotFound(name.to_string())
        })?;
        Ok(HtmlRender::new(template.clone(), context))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }
}
