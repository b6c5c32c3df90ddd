//! Manifest file declaring a project's named templates.
//!
//! A manifest (`templates.yml` by convention) lists every template an
//! application renders, and where its sources live:
//!
//! ```yaml
//! templates:
//!   - name: home
//!     files: [views/home.html, views/layout.html]
//!   - name: posts
//!     glob: "views/posts/*.html"
//!   - name: mail
//!     dir: emails
//!     files: ["*.txt"]
//!   - name: hello
//!     string: "Hello {{ name }}"
//!   - name: page
//!     strings:
//!       - "<p>{% block content %}{% endblock %}</p>"
//!       - "{% extends \"page.0\" %}{% block content %}{{ msg }}{% endblock %}"
//! ```
//!
//! Relative paths are resolved against the directory holding the manifest.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DirFs, FuncMap, Recipe, Renderer};
use crate::core::error::{Error, Result};

/// The root manifest structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Templates to register, in order
    #[serde(default)]
    pub templates: Vec<TemplateEntry>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// One named template and its sources. Exactly one of `files` (optionally with
/// `dir`), `glob`, `string`, or `strings` must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateEntry {
    /// Registry key
    pub name: String,

    /// Root directory for `files`, read through a filesystem handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Files (or, with `dir`, patterns) parsed as one set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    /// Glob pattern on the local filesystem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glob: Option<String>,

    /// A literal template body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,

    /// Literal bodies parsed in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strings: Vec<String>,
}

impl TemplateEntry {
    /// Turn the entry into a recipe, resolving paths against `base_dir`
    pub fn recipe(&self, base_dir: &Path) -> Result<Recipe> {
        if self.name.is_empty() {
            return Err(Error::config("manifest entry without a name"));
        }

        let sources = [
            !self.files.is_empty(),
            self.glob.is_some(),
            self.string.is_some(),
            !self.strings.is_empty(),
        ];
        if sources.iter().filter(|set| **set).count() != 1 {
            return Err(Error::config(format!(
                "template '{}' must set exactly one of files, glob, string, strings",
                self.name
            )));
        }
        if self.dir.is_some() && self.files.is_empty() {
            return Err(Error::config(format!(
                "template '{}' sets dir without files",
                self.name
            )));
        }

        let name = self.name.clone();
        let recipe = if let Some(dir) = &self.dir {
            Recipe::Fs {
                name,
                fs: Arc::new(DirFs::new(base_dir.join(dir))),
                files: self.files.clone(),
            }
        } else if !self.files.is_empty() {
            Recipe::Files {
                name,
                files: self.files.iter().map(|f| base_dir.join(f)).collect(),
            }
        } else if let Some(pattern) = &self.glob {
            Recipe::Glob {
                name,
                pattern: base_dir.join(pattern).to_string_lossy().into_owned(),
            }
        } else if let Some(body) = &self.string {
            Recipe::Literal {
                name,
                body: body.clone(),
            }
        } else {
            Recipe::LiteralsFuncs {
                name,
                funcs: FuncMap::new(),
                bodies: self.strings.clone(),
            }
        };
        Ok(recipe)
    }
}

impl TemplateManifest {
    /// Parse a manifest from YAML text
    pub fn from_yaml(content: &str, base_dir: &Path) -> Result<Self> {
        let mut manifest: Self = serde_yaml::from_str(content)?;
        manifest.base_dir = base_dir.to_path_buf();
        Ok(manifest)
    }

    /// Load a manifest file; relative paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading template manifest from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_yaml(&content, &base_dir)
    }

    /// Register every entry, stopping at the first failure.
    ///
    /// Returns the number of templates registered.
    pub fn register(&self, renderer: &mut dyn Renderer) -> Result<usize> {
        for entry in &self.templates {
            renderer.register(entry.recipe(&self.base_dir)?)?;
        }
        debug!("Registered {} templates from manifest", self.templates.len());
        Ok(self.templates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::templates::{DynamicRender, Render};
    use tempfile::TempDir;
    use tera::Context;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("views/posts")).unwrap();
        std::fs::create_dir_all(root.join("emails")).unwrap();
        std::fs::write(
            root.join("views/layout.html"),
            "<body>{% block body %}{% endblock %}</body>",
        )
        .unwrap();
        std::fs::write(
            root.join("views/home.html"),
            "{% extends \"layout.html\" %}{% block body %}home{% endblock %}",
        )
        .unwrap();
        std::fs::write(root.join("views/posts/first.html"), "first").unwrap();
        std::fs::write(root.join("views/posts/second.html"), "second").unwrap();
        std::fs::write(root.join("emails/welcome.txt"), "welcome {{ user }}").unwrap();
        std::fs::write(
            root.join("templates.yml"),
            r#"
templates:
  - name: home
    files: [views/home.html, views/layout.html]
  - name: posts
    glob: "views/posts/*.html"
  - name: mail
    dir: emails
    files: ["*.txt"]
  - name: hello
    string: "Hello {{ name }}"
  - name: page
    strings:
      - "<p>{% block content %}{% endblock %}</p>"
      - "{% extends \"page.0\" %}{% block content %}{{ msg }}{% endblock %}"
"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_load_and_register_every_kind() {
        let dir = project();
        let manifest = TemplateManifest::load(&dir.path().join("templates.yml")).unwrap();
        assert_eq!(manifest.templates.len(), 5);
        assert_eq!(manifest.base_dir, dir.path());

        let mut renderer = Render::new();
        assert_eq!(manifest.register(&mut renderer).unwrap(), 5);
        assert_eq!(
            renderer.names(),
            vec!["hello", "home", "mail", "page", "posts"]
        );

        let home = renderer.instance("home", Context::new()).unwrap();
        assert_eq!(home.render().unwrap(), "<body>home</body>");

        let posts = renderer.instance("posts", Context::new()).unwrap();
        assert_eq!(posts.template().name(), "first.html");

        let mut context = Context::new();
        context.insert("user", "bo");
        let mail = renderer.instance("mail", context).unwrap();
        assert_eq!(mail.render().unwrap(), "welcome bo");

        let mut context = Context::new();
        context.insert("msg", "hey");
        let page = renderer.instance("page", context).unwrap();
        assert_eq!(page.render().unwrap(), "<p>hey</p>");
    }

    #[test]
    fn test_register_into_dynamic_renderer() {
        let dir = project();
        let manifest = TemplateManifest::load(&dir.path().join("templates.yml")).unwrap();
        let mut renderer = DynamicRender::new();
        manifest.register(&mut renderer).unwrap();

        std::fs::write(dir.path().join("views/posts/first.html"), "edited").unwrap();
        let posts = renderer.instance("posts", Context::new()).unwrap();
        assert_eq!(posts.render().unwrap(), "edited");
    }

    #[test]
    fn test_entry_with_two_sources_is_rejected() {
        let entry = TemplateEntry {
            name: "home".to_string(),
            glob: Some("*.html".to_string()),
            string: Some("hi".to_string()),
            ..TemplateEntry::default()
        };
        match entry.recipe(Path::new(".")) {
            Err(Error::Config(msg)) => assert!(msg.contains("exactly one")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_without_name_is_rejected() {
        let entry = TemplateEntry {
            string: Some("hi".to_string()),
            ..TemplateEntry::default()
        };
        assert!(matches!(
            entry.recipe(Path::new(".")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = TemplateManifest::from_yaml(
            "templates:\n  - name: a\n    body: nope\n",
            Path::new("."),
        );
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_register_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        let manifest = TemplateManifest::from_yaml(
            "templates:\n  - name: ok\n    string: fine\n  - name: broken\n    files: [missing.html]\n  - name: later\n    string: never\n",
            dir.path(),
        )
        .unwrap();

        let mut renderer = Render::new();
        assert!(matches!(
            manifest.register(&mut renderer),
            Err(Error::Io { .. })
        ));
        assert_eq!(renderer.names(), vec!["ok"]);
    }
}
