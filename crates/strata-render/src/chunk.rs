//! Render chunks and byte assembly.

use futures::stream::{self, BoxStream, StreamExt};
use strata_core::RenderError;

/// One fragment of render output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Text classified as HTML.
    Html(String),
    /// Raw bytes, emitted as-is.
    Bytes(Vec<u8>),
}

impl Chunk {
    /// Create an HTML chunk.
    pub fn html(html: impl Into<String>) -> Self {
        Self::Html(html.into())
    }

    /// Create a raw byte chunk.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Check if this chunk is classified as HTML.
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html(_))
    }

    /// Borrow the chunk's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Html(html) => html.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }

    /// Convert into owned bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Html(html) => html.into_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

impl From<&str> for Chunk {
    fn from(html: &str) -> Self {
        Self::html(html)
    }
}

impl From<String> for Chunk {
    fn from(html: String) -> Self {
        Self::Html(html)
    }
}

/// Lazy, single-pass sequence of chunks produced by a render.
pub type ChunkStream = BoxStream<'static, Result<Chunk, RenderError>>;

/// Build a chunk stream from already-rendered chunks.
pub fn chunk_stream<I>(chunks: I) -> ChunkStream
where
    I: IntoIterator<Item = Chunk>,
    I::IntoIter: Send + 'static,
{
    stream::iter(chunks.into_iter().map(Ok)).boxed()
}

/// Accumulates chunks into a single byte buffer.
#[derive(Debug, Default)]
pub struct HtmlParts {
    buf: Vec<u8>,
}

impl HtmlParts {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk's bytes.
    pub fn append(&mut self, chunk: &Chunk) {
        self.buf.extend_from_slice(chunk.as_bytes());
    }

    /// Bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the assembled bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Drain a chunk stream into one byte buffer, preserving chunk order.
pub async fn assemble(mut chunks: ChunkStream) -> Result<Vec<u8>, RenderError> {
    let mut parts = HtmlParts::new();
    while let Some(chunk) = chunks.next().await {
        parts.append(&chunk?);
    }
    Ok(parts.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_classification() {
        assert!(Chunk::html("<p>").is_html());
        assert!(!Chunk::bytes(vec![0xde, 0xad]).is_html());
        assert!(Chunk::from("text").is_html());
    }

    #[test]
    fn test_chunk_bytes() {
        assert_eq!(Chunk::html("é").as_bytes(), "é".as_bytes());
        assert_eq!(Chunk::bytes(b"raw".to_vec()).into_bytes(), b"raw".to_vec());
    }

    #[tokio::test]
    async fn test_assemble_preserves_order() {
        let chunks = chunk_stream(vec![
            Chunk::html("<main>"),
            Chunk::bytes(b"<b>bold</b>".to_vec()),
            Chunk::html("</main>"),
        ]);

        let bytes = assemble(chunks).await.unwrap();
        assert_eq!(bytes, b"<main><b>bold</b></main>");
    }

    #[tokio::test]
    async fn test_assemble_empty() {
        let bytes = assemble(chunk_stream(Vec::new())).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_assemble_propagates_error() {
        let chunks = stream::iter(vec![
            Ok(Chunk::html("<p>")),
            Err(RenderError::Stream("component threw".into())),
            Ok(Chunk::html("</p>")),
        ])
        .boxed();

        let err = assemble(chunks).await.unwrap_err();
        assert!(matches!(err, RenderError::Stream(_)));
    }
}
