//! Shared test doubles: a scripted transport and SSE body builders.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use devprompt::transport::{ChunkStream, GenerativeTransport, StreamChunk};
use devprompt::{ComposedPayload, EnhanceError, EnhancerConfig, InterceptorRegistry, PromptEnhancer, RetryPolicy};

pub type Outcome = Result<Vec<Result<StreamChunk, EnhanceError>>, EnhanceError>;

/// Transport that replays one scripted outcome per `open_stream` call and
/// records every payload it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Outcome>>,
    payloads: Mutex<Vec<ComposedPayload>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        })
    }

    /// A transport whose single call streams `fragments`.
    pub fn fragments(fragments: &[&str]) -> Arc<Self> {
        Self::new(vec![Ok(fragments
            .iter()
            .map(|f| Ok(StreamChunk::text(*f)))
            .collect())])
    }

    /// A transport that always fails to establish with `status`.
    pub fn failing(status: u16, times: usize) -> Arc<Self> {
        Self::new(
            (0..times)
                .map(|_| Err(EnhanceError::transport(status, format!("upstream status {status}"))))
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<ComposedPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeTransport for ScriptedTransport {
    async fn open_stream(&self, payload: &ComposedPayload) -> Result<ChunkStream, EnhanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more often than scripted");
        Ok(Box::pin(futures_util::stream::iter(outcome?)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Retry policy with the default shape but millisecond delays.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new().with_initial_delay(Duration::from_millis(5))
}

/// Enhancer with a key, fast retries and an isolated interceptor registry.
pub fn enhancer_with(transport: Arc<ScriptedTransport>) -> (PromptEnhancer, Arc<InterceptorRegistry>) {
    let registry = Arc::new(InterceptorRegistry::new());
    let config = EnhancerConfig::new()
        .with_api_key("test-api-key")
        .with_retry(fast_retry());
    let enhancer = PromptEnhancer::new(config, transport).with_interceptors(registry.clone());
    (enhancer, registry)
}

/// One Gemini stream chunk carrying `text`.
pub fn gemini_chunk(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "index": 0
        }],
        "modelVersion": "gemini-2.5-flash"
    })
}

/// Encode JSON values as an SSE body of `data:` events.
pub fn sse_body(events: &[serde_json::Value]) -> String {
    events
        .iter()
        .map(|event| format!("data: {event}\r\n\r\n"))
        .collect()
}
