//! Error handling for the multitemplate library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Source errors (missing files,
//! malformed template syntax, globs matching nothing) are reported through
//! `Error`; misuse of the registry API (an empty template name) panics instead.
//!
//! # Examples
//!
//! ```
//! use multitemplate::core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("mode must be `debug` or `release`"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for template registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for template registry operations
#[derive(Debug, Error)]
pub enum Error {
    /// A registration was attempted with an empty name
    #[error("template name cannot be empty")]
    EmptyName,

    /// Lookup of a name that was never registered
    #[error("template with name `{0}` not found")]
    TemplateNotFound(String),

    /// A registration was given no files or bodies to parse
    #[error("no template sources given for `{0}`")]
    NoSources(String),

    /// A glob pattern matched no files
    #[error("pattern matches no files: `{0}`")]
    NoMatches(String),

    /// A glob pattern could not be parsed
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Reading a template source failed
    #[error("failed to read template source {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template engine error (parse or render)
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// A template set does not contain the template it is supposed to render
    #[error("template set has no root template named `{name}`")]
    MissingRoot { name: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an I/O error with the path that caused it
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
