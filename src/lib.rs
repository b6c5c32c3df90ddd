//! multitemplate
//!
//! A registry of named [tera](https://keats.github.io/tera/) templates for HTML
//! rendering layers. Templates are registered once at startup from files, glob
//! patterns, filesystem handles or literal strings, then resolved by name at
//! render time.
//!
//! In debug mode every render rebuilds its template from source, so template
//! edits show up without a restart. In release mode each template is built
//! once.
//!
//! ```
//! use multitemplate::{Context, RenderMode, Renderer, RendererConfig, new_renderer};
//!
//! let mut views = new_renderer(&RendererConfig::with_mode(RenderMode::Debug));
//! views.add_from_string("hello", "Hello {{ name }}!")?;
//!
//! let mut context = Context::new();
//! context.insert("name", "world");
//! assert_eq!(views.instance("hello", context)?.render()?, "Hello world!");
//! # Ok::<(), multitemplate::Error>(())
//! ```
#![deny(unsafe_code)]

pub mod core;
#[cfg(feature = "axum")]
pub mod http;

pub use crate::core::{
    Error,
    config::{RenderMode, RendererConfig},
    error::Result,
    templates::{
        DirFs, DynamicRender, EmbeddedFs, FuncMap, HtmlRender, MemoryFs, Recipe, Render,
        Renderer, Template, TemplateFs, TemplateManifest, new_renderer,
    },
};
pub use tera::Context;
