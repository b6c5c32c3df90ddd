//! Filesystem handles that template sources can be read through.
//!
//! A recipe that reads its sources through a `TemplateFs` does not touch the
//! process's ambient filesystem directly. This lets templates live in a
//! directory rooted somewhere other than the working directory, in a bundle
//! compiled into the binary with `rust-embed`, or purely in memory.
//!
//! Paths handed to a `TemplateFs` are always relative and `/`-separated.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    marker::PhantomData,
    path::{Component, Path, PathBuf},
};

use glob::{MatchOptions, Pattern};
use rust_embed::RustEmbed;

use crate::core::error::{Error, Result};

/// Abstract read-only filesystem holding template sources
pub trait TemplateFs: Send + Sync + fmt::Debug {
    /// Read the file at `path` as UTF-8 text
    fn read_to_string(&self, path: &str) -> Result<String>;

    /// List every file path the handle can serve, `/`-separated
    fn paths(&self) -> Result<Vec<String>>;
}

/// Template sources in a directory on disk
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    /// Serve files below `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Directory this handle is rooted at
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::io(
                relative,
                io::Error::new(io::ErrorKind::InvalidInput, "path escapes template root"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl TemplateFs for DirFs {
    fn read_to_string(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|e| Error::io(&full, e))
    }

    fn paths(&self) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        walk(&self.root, &self.root, &mut paths)?;
        paths.sort();
        Ok(paths)
    }
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;

        if file_type.is_dir() {
            walk(root, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(to_slash(relative));
        }
    }
    Ok(())
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Template sources compiled into the binary with `rust-embed`
///
/// ```ignore
/// #[derive(rust_embed::RustEmbed)]
/// #[folder = "templates/"]
/// struct Views;
///
/// renderer.add_from_fs("index", Arc::new(EmbeddedFs::<Views>::new()), &["index.html"])?;
/// ```
pub struct EmbeddedFs<E> {
    _bundle: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedFs<E> {
    pub fn new() -> Self {
        Self {
            _bundle: PhantomData,
        }
    }
}

impl<E: RustEmbed> Default for EmbeddedFs<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EmbeddedFs<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedFs")
            .field("bundle", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E: RustEmbed> TemplateFs for EmbeddedFs<E> {
    fn read_to_string(&self, path: &str) -> Result<String> {
        let file = E::get(path).ok_or_else(|| {
            Error::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "not found in embedded bundle"),
            )
        })?;
        String::from_utf8(file.data.into_owned())
            .map_err(|e| Error::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn paths(&self) -> Result<Vec<String>> {
        let mut paths: Vec<String> = E::iter().map(|p| p.into_owned()).collect();
        paths.sort();
        Ok(paths)
    }
}

/// Template sources held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<String, String>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style
    pub fn with_file<P: Into<String>, C: Into<String>>(mut self, path: P, content: C) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or replace a file
    pub fn insert<P: Into<String>, C: Into<String>>(&mut self, path: P, content: C) {
        self.files.insert(path.into(), content.into());
    }
}

impl TemplateFs for MemoryFs {
    fn read_to_string(&self, path: &str) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            Error::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "not found in memory filesystem"),
            )
        })
    }

    fn paths(&self) -> Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }
}

/// Whether `s` contains glob metacharacters
pub fn is_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Expand a list of literal paths and glob patterns against a filesystem handle.
///
/// Literal paths are passed through unchanged (a missing file is reported when
/// it is read). Each pattern must match at least one file; the matches of one
/// pattern are sorted. `*` does not cross `/`.
pub fn expand(fs: &dyn TemplateFs, patterns: &[String]) -> Result<Vec<String>> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let mut listing: Option<Vec<String>> = None;
    let mut matched = Vec::new();

    for pattern in patterns {
        if !is_pattern(pattern) {
            matched.push(pattern.clone());
            continue;
        }

        let compiled = Pattern::new(pattern)?;
        if listing.is_none() {
            listing = Some(fs.paths()?);
        }
        let mut hits: Vec<String> = listing
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|p| compiled.matches_with(p.as_str(), options))
            .cloned()
            .collect();

        if hits.is_empty() {
            return Err(Error::NoMatches(pattern.clone()));
        }
        hits.sort();
        matched.extend(hits);
    }

    Ok(matched)
}
