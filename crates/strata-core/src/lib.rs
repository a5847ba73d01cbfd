//! Core types for the strata page rendering pipeline.
//!
//! This crate provides the shared vocabulary of a render:
//! - `RenderContext` - Per-render state threaded through a page render
//! - `RouteData` / `RouteCache` - Route descriptors and expanded path props
//! - `SiteConfig` - Typed build configuration
//! - `RenderError` - Error taxonomy for a single path render

mod config;
mod context;
mod error;
mod renderer;
mod route;

pub use config::*;
pub use context::*;
pub use error::*;
pub use renderer::*;
pub use route::*;
