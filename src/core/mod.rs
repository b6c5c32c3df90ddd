//! Core of the multitemplate library: configuration, errors and the template
//! registry.

pub mod config;
pub mod error;
pub mod templates;

pub use error::Error;
