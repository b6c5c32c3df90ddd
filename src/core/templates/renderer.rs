//! The registry interface shared by both render modes.
//!
//! Registration happens during application setup, through `&mut self`; rendering
//! goes through `&self` only, so a fully populated renderer can be shared across
//! request handlers behind an `Arc` without locking. Registering after serving
//! has begun is the caller's responsibility to avoid.

use std::{io::Write, path::PathBuf, sync::Arc};

use tera::Context;
use tracing::info;

use super::{DynamicRender, FuncMap, Recipe, Render, Template, TemplateFs};
use crate::core::{
    config::{RenderMode, RendererConfig},
    error::{Error, Result},
};

/// A built template paired with the data to render it with
#[derive(Debug, Clone)]
pub struct HtmlRender {
    template: Template,
    context: Context,
}

impl HtmlRender {
    /// Content type of the rendered output
    pub const CONTENT_TYPE: &'static str = "text/html; charset=utf-8";

    pub fn new(template: Template, context: Context) -> Self {
        Self { template, context }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Render to a string
    pub fn render(&self) -> Result<String> {
        self.template.render(&self.context)
    }

    /// Render straight into `writer`
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        self.template.render_to(&self.context, writer)
    }
}

/// Panics on an empty registry name.
///
/// An empty name is a programming error rather than a runtime condition.
pub(crate) fn check_name(name: &str) {
    if name.is_empty() {
        panic!("{}", Error::EmptyName);
    }
}

mod sealed {
    use super::{Recipe, Template};

    /// Storage half of a renderer, reachable only through [`super::Renderer::register`]
    /// and [`super::Renderer::add`]
    pub trait Store {
        /// Keep a recipe and the template it just built under `name`
        fn store(&mut self, name: &str, recipe: Recipe, built: Template);
    }
}

pub(crate) use sealed::Store;

fn paths(files: &[&str]) -> Vec<PathBuf> {
    files.iter().map(PathBuf::from).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A registry of named templates that can produce renderable units.
///
/// Every `add_from_*` method builds its recipe immediately and returns the
/// result, so broken sources surface at startup. On error nothing is stored.
/// Registering a name twice replaces the earlier entry.
///
/// The trait is sealed: entries only get in through the registration methods,
/// which check the name and build first.
///
/// ```compile_fail
/// use multitemplate::{Recipe, Renderer, RendererConfig, Template, new_renderer};
///
/// let mut renderer = new_renderer(&RendererConfig::default());
/// let template = Template::parse("card", "hi").unwrap();
/// let recipe = Recipe::Prebuilt { name: String::new(), template: template.clone() };
/// renderer.store("", recipe, template);
/// ```
///
/// # Panics
///
/// Every registration method panics when `name` is empty.
pub trait Renderer: Store + Send + Sync {
    /// Settings used for every build
    fn config(&self) -> &RendererConfig;

    /// Whether this renderer rebuilds on every render or replays built templates
    fn mode(&self) -> RenderMode;

    /// Resolve `name` into a renderable unit carrying `context`
    fn instance(&self, name: &str, context: Context) -> Result<HtmlRender>;

    /// Sorted registry keys
    fn names(&self) -> Vec<String>;

    /// Build `recipe` and store it under its name
    fn register(&mut self, recipe: Recipe) -> Result<Template> {
        check_name(recipe.name());
        let built = recipe.build(self.config())?;
        let name = recipe.name().to_string();
        info!(
            "Registered template '{}' ({} recipe, root '{}')",
            name,
            recipe.kind(),
            built.name()
        );
        self.store(&name, recipe, built.clone());
        Ok(built)
    }

    /// Register an already built template. It is never rebuilt.
    fn add(&mut self, name: &str, template: Template) {
        check_name(name);
        info!("Registered prebuilt template '{}'", name);
        let recipe = Recipe::Prebuilt {
            name: name.to_string(),
            template: template.clone(),
        };
        self.store(name, recipe, template);
    }

    /// Parse `files` as one set; the first file is executed
    fn add_from_files(&mut self, name: &str, files: &[&str]) -> Result<Template> {
        self.register(Recipe::Files {
            name: name.to_string(),
            files: paths(files),
        })
    }

    /// Parse every file matching `pattern`; fails when nothing matches
    fn add_from_glob(&mut self, name: &str, pattern: &str) -> Result<Template> {
        self.register(Recipe::Glob {
            name: name.to_string(),
            pattern: pattern.to_string(),
        })
    }

    /// Parse `files` (paths or patterns) read through `fs`
    fn add_from_fs(
        &mut self,
        name: &str,
        fs: Arc<dyn TemplateFs>,
        files: &[&str],
    ) -> Result<Template> {
        self.register(Recipe::Fs {
            name: name.to_string(),
            fs,
            files: strings(files),
        })
    }

    /// As [`Renderer::add_from_fs`], with `funcs` available to the templates.
    ///
    /// The executed template is named after the first file's base name, not
    /// after `name`.
    fn add_from_fs_funcs(
        &mut self,
        name: &str,
        funcs: FuncMap,
        fs: Arc<dyn TemplateFs>,
        files: &[&str],
    ) -> Result<Template> {
        self.register(Recipe::FsFuncs {
            name: name.to_string(),
            funcs,
            fs,
            files: strings(files),
        })
    }

    /// Parse a literal body under `name`
    fn add_from_string(&mut self, name: &str, body: &str) -> Result<Template> {
        self.register(Recipe::Literal {
            name: name.to_string(),
            body: body.to_string(),
        })
    }

    /// Parse `bodies` in order into one set sharing `funcs`.
    ///
    /// The last body is executed under `name`; body `k` before it is named
    /// `{name}.{k}` so later bodies can extend or include it.
    fn add_from_strings_funcs(
        &mut self,
        name: &str,
        funcs: FuncMap,
        bodies: &[&str],
    ) -> Result<Template> {
        self.register(Recipe::LiteralsFuncs {
            name: name.to_string(),
            funcs,
            bodies: strings(bodies),
        })
    }

    /// As [`Renderer::add_from_files`], with `funcs` available to the templates
    fn add_from_files_funcs(
        &mut self,
        name: &str,
        funcs: FuncMap,
        files: &[&str],
    ) -> Result<Template> {
        self.register(Recipe::FilesFuncs {
            name: name.to_string(),
            funcs,
            files: paths(files),
        })
    }

    fn len(&self) -> usize {
        self.names().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pick the renderer for the configured mode
pub fn new_renderer(config: &RendererConfig) -> Box<dyn Renderer> {
    info!("Using {} template renderer", config.mode);
    match config.mode {
        RenderMode::Debug => Box::new(DynamicRender::with_config(config.clone())),
        RenderMode::Release => Box::new(Render::with_config(config.clone())),
    }
}
