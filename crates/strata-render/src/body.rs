//! Response bodies: buffered bytes or a live byte stream.

use std::fmt;

use futures::channel::mpsc;
use futures::stream::BoxStream;
use futures::{SinkExt, StreamExt};
use strata_core::RenderError;

use crate::chunk::ChunkStream;

/// Live byte stream produced by a background render task.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, RenderError>>;

/// Slots between the render task and the consumer.
const CHANNEL_CAPACITY: usize = 1;

/// Body of a rendered response.
pub enum Body {
    /// Fully materialized bytes.
    Full(Vec<u8>),
    /// Bytes produced as the consumer pulls.
    Stream(ByteStream),
}

impl Body {
    /// An empty buffered body.
    pub fn empty() -> Self {
        Self::Full(Vec::new())
    }

    /// Byte length, when known upfront.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Full(bytes) => Some(bytes.len()),
            Self::Stream(_) => None,
        }
    }

    /// Check if this body is streamed.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Drain the body into bytes.
    pub async fn collect(self) -> Result<Vec<u8>, RenderError> {
        match self {
            Self::Full(bytes) => Ok(bytes),
            Self::Stream(mut stream) => {
                let mut out = Vec::new();
                while let Some(bytes) = stream.next().await {
                    out.extend_from_slice(&bytes?);
                }
                Ok(out)
            }
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Full(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Full(text.into_bytes())
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Spawn a task that pulls `chunks` and feeds their bytes to the returned stream.
///
/// The task stops pulling once the consumer drops the stream. An error from
/// the chunk sequence is forwarded as the final item.
pub fn spawn_byte_stream(chunks: ChunkStream) -> ByteStream {
    let (mut tx, rx) = mpsc::channel::<Result<Vec<u8>, RenderError>>(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut chunks = chunks;
        while let Some(next) = chunks.next().await {
            match next {
                Ok(chunk) => {
                    if tx.send(Ok(chunk.into_bytes())).await.is_err() {
                        tracing::debug!(target: "strata::render", "stream consumer closed");
                        return;
                    }
                }
                Err(err) => {
                    tracing::warn!(target: "strata::render", error = %err, "aborting page stream");
                    let _ = tx.send(Err(err)).await;
                    return;
                }
            }
        }
    });

    rx.boxed()
}
