//! Chunk renderer: buffered and streamed page output.
//!
//! This crate turns a page unit into a response:
//! - `Chunk` / `ChunkStream` - Single-pass render fragments
//! - `decorate_first_chunk` - Doctype and head injection stage
//! - `HeadElements` - Stylesheet and script elements for the head
//! - `Body` - Buffered bytes or a live byte stream
//! - `render_page` / `render` - The rendering contract

mod body;
mod chunk;
mod doctype;
mod head;
mod outcome;
mod page;

pub use body::*;
pub use chunk::*;
pub use doctype::*;
pub use head::*;
pub use outcome::*;
pub use page::*;
