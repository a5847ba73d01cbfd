//! Static page generation.
//!
//! This crate drives full-site generation:
//! - `BuildInternals` - Registry of pages and bundled entry specifiers
//! - `SpecifierResolver` - Per-path module specifier resolution
//! - `BatchScheduler` - Bounded, batch-ordered render concurrency
//! - `generate_pages` - Render every page path and persist the HTML
//! - `GenerationReport` - What was written, skipped and failed

mod entry;
mod generate;
mod internals;
mod output;
mod renderers;
mod report;
mod resolve;
mod scheduler;

pub use entry::*;
pub use generate::*;
pub use internals::*;
pub use output::*;
pub use renderers::*;
pub use report::*;
pub use resolve::*;
pub use scheduler::*;
