//! Named template registry.
//!
//! This module maps logical template names to build recipes and turns a recipe
//! into something renderable on demand. Two registries implement the
//! [`Renderer`] interface:
//!
//! - [`DynamicRender`] rebuilds a template from its sources on every render,
//!   for fast iteration during development
//! - [`Render`] builds each template once, when it is registered
//!
//! [`new_renderer`] picks one from a [`RendererConfig`](crate::core::config::RendererConfig).
//!
//! Sources can be files on disk, glob patterns, files read through a
//! [`TemplateFs`] handle (a directory, an embedded bundle, or memory), or
//! literal strings, optionally with a [`FuncMap`] of callables.

pub mod dynamic;
pub mod fs;
pub mod funcs;
pub mod manifest;
pub mod multi;
pub mod recipe;
pub mod renderer;
pub mod template;

pub use dynamic::*;
pub use fs::*;
pub use funcs::*;
pub use manifest::*;
pub use multi::*;
pub use recipe::*;
pub use renderer::*;
pub use template::*;
