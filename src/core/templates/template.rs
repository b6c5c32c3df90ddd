//! The executable template handed out by renderers.

use std::{fmt, io::Write, sync::Arc};

use tera::{Context, Tera};

use super::recipe::new_set;
use crate::core::{
    config::RendererConfig,
    error::{Error, Result},
};

/// A parsed template set together with the name of the template to execute.
///
/// Cloning is cheap; the underlying `Tera` instance is shared.
#[derive(Clone)]
pub struct Template {
    name: String,
    tera: Arc<Tera>,
}

impl Template {
    /// Wrap a template set, executing the template called `name`.
    ///
    /// Fails with [`Error::MissingRoot`] when the set holds no such template.
    pub fn new<S: Into<String>>(name: S, tera: Tera) -> Result<Self> {
        Self::from_shared(name, Arc::new(tera))
    }

    /// Same as [`Template::new`] for a set that is already shared
    pub fn from_shared<S: Into<String>>(name: S, tera: Arc<Tera>) -> Result<Self> {
        let name = name.into();
        if !tera.get_template_names().any(|n| n == name) {
            return Err(Error::MissingRoot { name });
        }
        Ok(Self { name, tera })
    }

    /// Parse a single template body under `name` with tera's default settings.
    ///
    /// Tera only autoescapes names ending in `.html`, `.htm` or `.xml`, so
    /// `parse("card", ..)` renders unescaped whatever the renderer's
    /// `autoescape` setting is. Use [`Template::parse_with_config`] to follow
    /// the configuration instead.
    pub fn parse(name: &str, body: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(name, body)?;
        Self::new(name, tera)
    }

    /// Parse a single template body the way renderers built with `config` do
    pub fn parse_with_config(name: &str, body: &str, config: &RendererConfig) -> Result<Self> {
        let mut tera = new_set(config, None);
        tera.add_raw_template(name, body)?;
        Self::new(name, tera)
    }

    /// Name of the template that gets executed
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The whole template set
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Sorted names of every template in the set
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    /// Whether the set contains a template called `name`
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    pub fn render(&self, context: &Context) -> Result<String> {
        Ok(self.tera.render(&self.name, context)?)
    }

    pub fn render_to<W: Write>(&self, context: &Context, writer: W) -> Result<()> {
        Ok(self.tera.render_to(&self.name, context, writer)?)
    }

    /// Whether both handles share the same template set
    pub fn ptr_eq(&self, other: &Template) -> bool {
        Arc::ptr_eq(&self.tera, &other.tera) && self.name == other.name
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("templates", &self.template_names())
            .finish()
    }
}
