//! Transport layer
//!
//! A [`GenerativeTransport`] opens one streaming generation call for a
//! [`ComposedPayload`] and hands back its chunks in arrival order. Failures
//! are reported raw (`EnhanceError::TransportError` with the HTTP status when
//! there is one); classification happens in the executor.

pub mod gemini;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::EnhanceError;
use crate::prompt::ComposedPayload;

pub use gemini::GeminiTransport;

/// One unit delivered by a transport. `text` is absent for chunks that carry
/// only metadata (usage, finish reason, thought summaries).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamChunk {
    pub text: Option<String>,
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub const fn empty() -> Self {
        Self { text: None }
    }
}

/// Chunks of one streaming call.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, EnhanceError>> + Send>>;

/// Opens streaming generation calls.
#[async_trait]
pub trait GenerativeTransport: Send + Sync {
    /// Establish the stream. Returning `Ok` means the provider accepted the
    /// request; later failures arrive as stream items.
    async fn open_stream(&self, payload: &ComposedPayload) -> Result<ChunkStream, EnhanceError>;

    /// Provider name used in logs.
    fn name(&self) -> &str;
}
