//! Renderer configuration.
//!
//! The render mode is an explicit value chosen once at startup, either from a
//! TOML file, from the environment, or from CLI flags. Nothing in the library
//! consults global state to decide between rebuilding templates on every render
//! and building them once.

use std::{env, fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{Error, Result};

/// Environment variable selecting the render mode (`debug` or `release`)
pub const MODE_ENV: &str = "MULTITEMPLATE_MODE";

/// Environment variable toggling HTML autoescaping (`true`/`false`)
pub const AUTOESCAPE_ENV: &str = "MULTITEMPLATE_AUTOESCAPE";

/// How registered templates are turned into renderable templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Rebuild every template from its sources on each render
    Debug,
    /// Build each template once, at registration
    #[default]
    Release,
}

impl RenderMode {
    /// Whether templates are rebuilt on every render
    pub fn reparses(self) -> bool {
        matches!(self, Self::Debug)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Release => write!(f, "release"),
        }
    }
}

impl FromStr for RenderMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "dev" | "development" => Ok(Self::Debug),
            "release" | "prod" | "production" => Ok(Self::Release),
            other => Err(Error::config(format!(
                "unknown render mode `{other}`, expected `debug` or `release`"
            ))),
        }
    }
}

/// Settings shared by every template a renderer builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Reparse-every-call or build-once
    pub mode: RenderMode,
    /// Escape every rendered expression as HTML
    pub autoescape: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            autoescape: true,
        }
    }
}

impl RendererConfig {
    /// Configuration for the given mode with default settings otherwise
    pub fn with_mode(mode: RenderMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        debug!("Loaded renderer config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `MULTITEMPLATE_MODE` and `MULTITEMPLATE_AUTOESCAPE` if set
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(mode) = env::var(MODE_ENV) {
            self.mode = mode.parse()?;
            debug!("Render mode from {}: {}", MODE_ENV, self.mode);
        }
        if let Ok(value) = env::var(AUTOESCAPE_ENV) {
            self.autoescape = parse_bool(&value).ok_or_else(|| {
                Error::config(format!("{AUTOESCAPE_ENV} must be true or false, got `{value}`"))
            })?;
        }
        Ok(self)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
