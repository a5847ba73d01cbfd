//! Doctype and head injection stage.

use async_stream::try_stream;
use futures::StreamExt;

use crate::chunk::{Chunk, ChunkStream};

/// Doctype line injected ahead of pages that lack one.
pub const DOCTYPE: &str = "<!DOCTYPE html>\n";

/// Check whether a first chunk needs a doctype in front of it.
///
/// Only HTML chunks qualify; the check is case-insensitive and ignores
/// leading whitespace.
pub fn needs_doctype(chunk: &Chunk) -> bool {
    match chunk {
        Chunk::Html(html) => !starts_with_doctype(html),
        Chunk::Bytes(_) => false,
    }
}

fn starts_with_doctype(html: &str) -> bool {
    const PREFIX: &str = "<!doctype html";
    html.trim_start()
        .get(..PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(PREFIX))
}

/// Decorate the first chunk of a render.
///
/// When chunk 0 needs a doctype, the doctype line is emitted before it,
/// followed by `head` (drained only in that case). Later chunks pass
/// through untouched.
pub fn decorate_first_chunk(chunks: ChunkStream, head: Option<ChunkStream>) -> ChunkStream {
    try_stream! {
        let mut chunks = chunks;
        let mut head = head;
        let mut first = true;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            if first {
                first = false;
                if needs_doctype(&chunk) {
                    yield Chunk::html(DOCTYPE);
                    if let Some(mut head) = head.take() {
                        while let Some(part) = head.next().await {
                            yield part?;
                        }
                    }
                }
            }
            yield chunk;
        }
    }
    .boxed()
}
