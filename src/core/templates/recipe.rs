//! Deferred build recipes.
//!
//! A `Recipe` records how to produce a [`Template`] without producing it. The
//! dynamic renderer keeps recipes and builds them on every render; the static
//! renderer builds each recipe once at registration.
//!
//! # Template naming
//!
//! File-based recipes register every file in the set under its base name, so
//! `{% extends "layout.html" %}` and `{% include "nav.html" %}` resolve the way
//! they read. The template that gets executed is the first file (the first
//! match, for globs). Literal recipes use the registry key as the root name.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tera::Tera;
use tracing::debug;

use super::{FuncMap, Template, TemplateFs, expand};
use crate::core::{
    config::RendererConfig,
    error::{Error, Result},
};

/// How to build a named template. Immutable once stored.
#[derive(Debug, Clone)]
pub enum Recipe {
    /// An already built template, never rebuilt
    Prebuilt { name: String, template: Template },
    /// Files on the ambient filesystem, parsed as one set
    Files { name: String, files: Vec<PathBuf> },
    /// Every file matching a glob pattern on the ambient filesystem
    Glob { name: String, pattern: String },
    /// Paths or patterns read through a filesystem handle
    Fs {
        name: String,
        fs: Arc<dyn TemplateFs>,
        files: Vec<String>,
    },
    /// As `Fs`, with callables available to the templates
    FsFuncs {
        name: String,
        funcs: FuncMap,
        fs: Arc<dyn TemplateFs>,
        files: Vec<String>,
    },
    /// A single literal body
    Literal { name: String, body: String },
    /// Several literal bodies parsed in order, sharing callables
    LiteralsFuncs {
        name: String,
        funcs: FuncMap,
        bodies: Vec<String>,
    },
    /// As `Files`, with callables available to the templates
    FilesFuncs {
        name: String,
        funcs: FuncMap,
        files: Vec<PathBuf>,
    },
}

impl Recipe {
    /// Registry key the recipe is stored under
    pub fn name(&self) -> &str {
        match self {
            Self::Prebuilt { name, .. }
            | Self::Files { name, .. }
            | Self::Glob { name, .. }
            | Self::Fs { name, .. }
            | Self::FsFuncs { name, .. }
            | Self::Literal { name, .. }
            | Self::LiteralsFuncs { name, .. }
            | Self::FilesFuncs { name, .. } => name,
        }
    }

    /// Short label for the recipe kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Prebuilt { .. } => "prebuilt",
            Self::Files { .. } => "files",
            Self::Glob { .. } => "glob",
            Self::Fs { .. } => "fs",
            Self::FsFuncs { .. } => "fs+funcs",
            Self::Literal { .. } => "string",
            Self::LiteralsFuncs { .. } => "strings+funcs",
            Self::FilesFuncs { .. } => "files+funcs",
        }
    }

    /// Run the recipe, parsing every source from scratch
    pub fn build(&self, config: &RendererConfig) -> Result<Template> {
        debug!("Building template '{}' from {} recipe", self.name(), self.kind());

        match self {
            Self::Prebuilt { template, .. } => Ok(template.clone()),
            Self::Files { name, files } => build_files(name, files, None, config),
            Self::Glob { pattern, name } => {
                build_files(name, &glob_files(pattern)?, None, config)
            }
            Self::Fs { name, fs, files } => build_fs(name, fs.as_ref(), files, None, config),
            Self::FsFuncs {
                name,
                funcs,
                fs,
                files,
            } => build_fs(name, fs.as_ref(), files, Some(funcs), config),
            Self::Literal { name, body } => {
                let mut tera = new_set(config, None);
                tera.add_raw_template(name, body)?;
                Template::new(name.as_str(), tera)
            }
            Self::LiteralsFuncs {
                name,
                funcs,
                bodies,
            } => build_literals(name, funcs, bodies, config),
            Self::FilesFuncs { name, funcs, files } => {
                build_files(name, files, Some(funcs), config)
            }
        }
    }
}

pub(crate) fn new_set(config: &RendererConfig, funcs: Option<&FuncMap>) -> Tera {
    let mut tera = Tera::default();
    if config.autoescape {
        // every name ends with ""
        tera.autoescape_on(vec![""]);
    } else {
        tera.autoescape_on(vec![]);
    }
    if let Some(funcs) = funcs {
        funcs.apply(&mut tera);
    }
    tera
}

/// Base name of a path, falling back to the path itself
pub fn base_name<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn assemble(
    sources: Vec<(String, String)>,
    funcs: Option<&FuncMap>,
    config: &RendererConfig,
) -> Result<Template> {
    let root = match sources.first() {
        Some((root, _)) => root.clone(),
        None => return Err(Error::config("template set built from no sources")),
    };

    let mut tera = new_set(config, funcs);
    tera.add_raw_templates(sources)?;
    Template::new(root, tera)
}

fn build_files(
    name: &str,
    files: &[PathBuf],
    funcs: Option<&FuncMap>,
    config: &RendererConfig,
) -> Result<Template> {
    if files.is_empty() {
        return Err(Error::NoSources(name.to_string()));
    }

    let sources = files
        .iter()
        .map(|path| {
            let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            Ok((base_name(path), content))
        })
        .collect::<Result<Vec<_>>>()?;

    assemble(sources, funcs, config)
}

fn glob_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::io(path, e.into())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(Error::NoMatches(pattern.to_string()));
    }
    Ok(files)
}

fn build_fs(
    name: &str,
    fs: &dyn TemplateFs,
    files: &[String],
    funcs: Option<&FuncMap>,
    config: &RendererConfig,
) -> Result<Template> {
    if files.is_empty() {
        return Err(Error::NoSources(name.to_string()));
    }

    let sources = expand(fs, files)?
        .into_iter()
        .map(|path| {
            let content = fs.read_to_string(&path)?;
            Ok((base_name(&path), content))
        })
        .collect::<Result<Vec<_>>>()?;

    assemble(sources, funcs, config)
}

fn build_literals(
    name: &str,
    funcs: &FuncMap,
    bodies: &[String],
    config: &RendererConfig,
) -> Result<Template> {
    let Some(last) = bodies.len().checked_sub(1) else {
        return Err(Error::NoSources(name.to_string()));
    };

    let mut tera = new_set(config, Some(funcs));
    for (index, body) in bodies.iter().enumerate() {
        let part = if index == last {
            name.to_string()
        } else {
            format!("{name}.{index}")
        };
        tera.add_raw_template(&part, body)?;
    }
    Template::new(name, tera)
}
