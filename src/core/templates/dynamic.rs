//! Reparse-every-call renderer for development.
//!
//! `DynamicRender` keeps only recipes. Each call to [`Renderer::instance`]
//! rebuilds the requested template from its sources, so edits to template files
//! are picked up on the next render without restarting the process. A failed
//! build is returned to the caller and nothing about it is remembered; the next
//! render tries again from scratch.

use std::collections::HashMap;

use tera::Context;
use tracing::{debug, warn};

use super::{HtmlRender, Recipe, Renderer, Template, renderer::Store};
use crate::core::{
    config::{RenderMode, RendererConfig},
    error::{Error, Result},
};

/// Template registry that rebuilds on every render
#[derive(Debug)]
pub struct DynamicRender {
    recipes: HashMap<String, Recipe>,
    config: RendererConfig,
}

impl DynamicRender {
    pub fn new() -> Self {
        Self::with_config(RendererConfig::with_mode(RenderMode::Debug))
    }

    /// Use `config` for every build. The mode is always debug.
    pub fn with_config(mut config: RendererConfig) -> Self {
        config.mode = RenderMode::Debug;
        Self {
            recipes: HashMap::new(),
            config,
        }
    }

    /// Recipe registered under `name`
    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }
}

impl Default for DynamicRender {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for DynamicRender {
    fn store(&mut self, name: &str, recipe: Recipe, _built: Template) {
        if self.recipes.insert(name.to_string(), recipe).is_some() {
            debug!("Replaced recipe for template '{}'", name);
        }
    }
}

impl Renderer for DynamicRender {
    fn config(&self) -> &RendererConfig {
        &self.config
    }

    fn mode(&self) -> RenderMode {
        RenderMode::Debug
    }

    fn instance(&self, name: &str, context: Context) -> Result<HtmlRender> {
        let recipe = self.recipes.get(name).ok_or_else(|| {
            warn!("Dynamic template with name '{}' not found", name);
            Error::TemplateNotFound(name.to_string())
        })?;

        let template = recipe.build(&self.config)?;
        Ok(HtmlRender::new(template, context))
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.recipes.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::templates::{DirFs, FuncMap};
    use std::{collections::HashMap as Map, path::Path, sync::Arc};
    use tempfile::TempDir;
    use tera::Value;
    use tracing_test::traced_test;

    fn write(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn context(key: &str, value: &str) -> Context {
        let mut context = Context::new();
        context.insert(key, value);
        context
    }

    fn shout(value: &Value, _: &Map<String, Value>) -> tera::Result<Value> {
        Ok(Value::String(value.as_str().unwrap_or_default().to_uppercase()))
    }

    #[test]
    fn test_prebuilt_lookup_uses_same_handle() {
        let mut renderer = DynamicRender::new();
        let template = Template::parse("hello", "Hello {{ name }}").unwrap();
        renderer.add("greeting", template.clone());

        let unit = renderer.instance("greeting", context("name", "Ada")).unwrap();
        assert!(unit.template().ptr_eq(&template));
        assert_eq!(unit.render().unwrap(), "Hello Ada");
    }

    #[test]
    fn test_reparses_changed_file_on_every_call() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "page.html", "version one");

        let mut renderer = DynamicRender::new();
        renderer.add_from_files("page", &[page.as_str()]).unwrap();
        assert_eq!(
            renderer.instance("page", Context::new()).unwrap().render().unwrap(),
            "version one"
        );

        write(dir.path(), "page.html", "version two");
        assert_eq!(
            renderer.instance("page", Context::new()).unwrap().render().unwrap(),
            "version two"
        );
    }

    #[test]
    fn test_reparses_through_fs_handle() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "index.html", "{{ title | shout }}");

        let mut renderer = DynamicRender::new();
        let built = renderer
            .add_from_fs_funcs(
                "home",
                FuncMap::new().filter("shout", shout),
                Arc::new(DirFs::new(dir.path())),
                &["*.html"],
            )
            .unwrap();
        assert_eq!(built.name(), "index.html");

        write(dir.path(), "index.html", "[{{ title | shout }}]");
        let unit = renderer.instance("home", context("title", "news")).unwrap();
        assert_eq!(unit.render().unwrap(), "[NEWS]");
    }

    #[test]
    fn test_broken_source_fails_then_recovers() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "page.html", "ok");

        let mut renderer = DynamicRender::new();
        renderer.add_from_files("page", &[page.as_str()]).unwrap();

        write(dir.path(), "page.html", "{% if %}");
        assert!(matches!(
            renderer.instance("page", Context::new()),
            Err(Error::Tera(_))
        ));

        write(dir.path(), "page.html", "fixed");
        let unit = renderer.instance("page", Context::new()).unwrap();
        assert_eq!(unit.render().unwrap(), "fixed");
    }

    #[test]
    #[traced_test]
    fn test_unknown_name_is_reported() {
        let renderer = DynamicRender::new();
        match renderer.instance("missing", Context::new()) {
            Err(Error::TemplateNotFound(name)) => assert_eq!(name, "missing"),
            other => panic!("Expected TemplateNotFound, got {:?}", other),
        }
        assert!(logs_contain("Dynamic template with name 'missing' not found"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut renderer = DynamicRender::new();
        renderer.add_from_string("page", "first").unwrap();
        renderer.add_from_string("page", "second").unwrap();

        assert_eq!(renderer.names(), vec!["page"]);
        let unit = renderer.instance("page", Context::new()).unwrap();
        assert_eq!(unit.render().unwrap(), "second");
    }

    #[test]
    fn test_failed_registration_stores_nothing() {
        let mut renderer = DynamicRender::new();
        let result = renderer.add_from_string("page", "{{ broken");
        assert!(result.is_err());
        assert!(renderer.recipe("page").is_none());
        assert!(renderer.is_empty());
    }

    #[test]
    #[should_panic(expected = "template name cannot be empty")]
    fn test_empty_name_panics() {
        let mut renderer = DynamicRender::new();
        let _ = renderer.add_from_string("", "body");
    }

    #[test]
    #[should_panic(expected = "template name cannot be empty")]
    fn test_empty_name_panics_for_prebuilt() {
        let mut renderer = DynamicRender::new();
        renderer.add("", Template::parse("t", "t").unwrap());
    }

    #[test]
    fn test_files_funcs_root_independent_of_key() {
        let dir = TempDir::new().unwrap();
        let first = write(dir.path(), "article.html", "{{ 'x' | shout }}");
        let second = write(dir.path(), "sidebar.html", "side");

        let mut renderer = DynamicRender::new();
        let built = renderer
            .add_from_files_funcs(
                "blog",
                FuncMap::new().filter("shout", shout),
                &[first.as_str(), second.as_str()],
            )
            .unwrap();
        assert_eq!(built.name(), "article.html");

        let unit = renderer.instance("blog", Context::new()).unwrap();
        assert_eq!(unit.template().name(), "article.html");
        assert_eq!(unit.render().unwrap(), "X");
    }

    #[test]
    fn test_with_config_forces_debug_mode() {
        let renderer = DynamicRender::with_config(RendererConfig::default());
        assert_eq!(renderer.config().mode, RenderMode::Debug);
        assert!(renderer.config().autoescape);
    }
}
