//! End-to-end pipeline behaviour against a scripted transport.

mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use devprompt::prelude::*;
use devprompt::transport::{ChunkStream, GenerativeTransport, StreamChunk};
use futures_util::StreamExt;
use support::{ScriptedTransport, enhancer_with};

const IDEA: &str = "a recipe sharing app with meal planning";

/// Sets its flag when the stream owning it is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Streams fragments forever, counting how many were pulled.
#[derive(Default)]
struct EndlessTransport {
    produced: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

#[async_trait]
impl GenerativeTransport for EndlessTransport {
    async fn open_stream(&self, _payload: &ComposedPayload) -> Result<ChunkStream, EnhanceError> {
        let guard = DropFlag(self.released.clone());
        let produced = self.produced.clone();
        Ok(Box::pin(futures_util::stream::iter(0u64..).map(move |i| {
            let _owned = &guard;
            produced.fetch_add(1, Ordering::SeqCst);
            Ok::<_, EnhanceError>(StreamChunk::text(format!("fragment {i}")))
        })))
    }

    fn name(&self) -> &str {
        "endless"
    }
}

#[tokio::test]
async fn fragments_arrive_in_order_and_empty_chunks_are_dropped() {
    let transport = ScriptedTransport::new(vec![Ok(vec![
        Ok(StreamChunk::text("a")),
        Ok(StreamChunk::empty()),
        Ok(StreamChunk::text("b")),
        Ok(StreamChunk::text("")),
        Ok(StreamChunk::text("c")),
    ])]);
    let (enhancer, _) = enhancer_with(transport.clone());

    let fragments: Vec<String> = enhancer
        .stream_enhancement(IDEA, &EnhancementOptions::default())
        .await
        .unwrap()
        .map(|f| f.unwrap())
        .collect()
        .await;

    assert_eq!(fragments, ["a", "b", "c"]);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn thinking_and_temperature_are_mutually_exclusive_on_the_wire() {
    let transport = ScriptedTransport::new(vec![
        Ok(vec![Ok(StreamChunk::text("x"))]),
        Ok(vec![Ok(StreamChunk::text("y"))]),
    ]);
    let (enhancer, _) = enhancer_with(transport.clone());

    enhancer
        .enhance(IDEA, &EnhancementOptions::new().with_thinking(true))
        .await
        .unwrap();
    enhancer
        .enhance(IDEA, &EnhancementOptions::new().with_thinking(false))
        .await
        .unwrap();

    let payloads = transport.payloads();
    let reasoning = serde_json::to_value(&payloads[0].generation).unwrap();
    let sampling = serde_json::to_value(&payloads[1].generation).unwrap();

    assert_eq!(reasoning["thinkingConfig"]["thinkingBudget"], 32768);
    assert!(reasoning.get("temperature").is_none());
    assert!(sampling.get("thinkingConfig").is_none());
    assert!(sampling["temperature"].as_f64().is_some());
    assert_eq!(payloads[0].model, "gemini-2.5-pro");
    assert_eq!(payloads[1].model, "gemini-2.5-flash");
}

#[tokio::test]
async fn every_terminal_status_maps_to_its_kind() {
    let cases = [
        (400, ErrorKind::InvalidRequest),
        (401, ErrorKind::Unauthorized),
        (403, ErrorKind::Forbidden),
        (404, ErrorKind::NotFound),
        (429, ErrorKind::RateLimited),
        (500, ErrorKind::ServerError),
        (503, ErrorKind::Unavailable),
    ];

    for (status, kind) in cases {
        // Retryable statuses are attempted 1 + 3 times.
        let transport = ScriptedTransport::failing(status, 4);
        let (enhancer, _) = enhancer_with(transport.clone());

        let err = enhancer
            .enhance(IDEA, &EnhancementOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), kind, "status {status}");
        assert_eq!(err.status_code(), Some(status), "status {status}");
        let expected_calls = if matches!(status, 429 | 500 | 503) { 4 } else { 1 };
        assert_eq!(transport.calls(), expected_calls, "status {status}");
        if status == 404 {
            assert!(err.message().contains("gemini-2.5-flash"));
        }
    }
}

#[tokio::test]
async fn invalid_request_is_attempted_once() {
    let transport = ScriptedTransport::failing(400, 1);
    let (enhancer, _) = enhancer_with(transport.clone());

    let err = enhancer
        .stream_enhancement(IDEA, &EnhancementOptions::default())
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn missing_credential_never_reaches_the_transport() {
    let transport = ScriptedTransport::new(vec![]);
    let enhancer = PromptEnhancer::new(EnhancerConfig::new(), transport.clone())
        .with_interceptors(Arc::new(InterceptorRegistry::new()));

    let err = enhancer
        .stream_enhancement(IDEA, &EnhancementOptions::default())
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::ConfigurationMissing);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn request_interceptors_compose_in_registration_order() {
    let transport = ScriptedTransport::fragments(&["ok"]);
    let (enhancer, registry) = enhancer_with(transport.clone());
    let original = enhancer.compose(IDEA, &EnhancementOptions::default());

    registry.add_request_interceptor(|mut p: ComposedPayload| {
        p.contents.push_str("[f]");
        p
    });
    registry.add_request_interceptor(|mut p: ComposedPayload| {
        p.contents.push_str("[g]");
        p
    });

    enhancer
        .enhance(IDEA, &EnhancementOptions::default())
        .await
        .unwrap();

    let sent = &transport.payloads()[0];
    assert_eq!(sent.contents, format!("{}[f][g]", original.contents));
    assert_eq!(sent.model, original.model);
}

#[tokio::test]
async fn transient_failures_are_retried_before_streaming() {
    let transport = ScriptedTransport::new(vec![
        Err(EnhanceError::transport(503, "overloaded")),
        Err(EnhanceError::transport(503, "overloaded")),
        Ok(vec![Ok(StreamChunk::text("enhanced"))]),
    ]);
    let (enhancer, registry) = enhancer_with(transport.clone());
    registry.add_error_interceptor(|_| panic!("no terminal error expected"));

    let text = enhancer
        .enhance(IDEA, &EnhancementOptions::default())
        .await
        .unwrap();

    assert_eq!(text, "enhanced");
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn mid_stream_failure_keeps_delivered_fragments() {
    let transport = ScriptedTransport::new(vec![Ok(vec![
        Ok(StreamChunk::text("first ")),
        Err(EnhanceError::network("connection reset by peer")),
    ])]);
    let (enhancer, _) = enhancer_with(transport.clone());

    let items: Vec<_> = enhancer
        .stream_enhancement(IDEA, &EnhancementOptions::default())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_deref().unwrap(), "first ");
    assert_eq!(items[1].as_ref().unwrap_err().kind(), ErrorKind::NetworkFailure);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn batch_runs_requests_concurrently_in_order() {
    let transport = ScriptedTransport::new(vec![
        Ok(vec![Ok(StreamChunk::text("one"))]),
        Ok(vec![Ok(StreamChunk::text("two"))]),
    ]);
    let (enhancer, _) = enhancer_with(transport.clone());

    let results = devprompt::enhance_all(
        &enhancer,
        vec![
            EnhancementRequest::new(IDEA, EnhancementOptions::default()),
            EnhancementRequest::new(IDEA, EnhancementOptions::default()),
        ],
        1,
    )
    .await;

    assert_eq!(results[0].as_deref().unwrap(), "one");
    assert_eq!(results[1].as_deref().unwrap(), "two");
}

#[tokio::test]
async fn dropping_the_stream_releases_the_transport() {
    let transport = Arc::new(EndlessTransport::default());
    let produced = transport.produced.clone();
    let released = transport.released.clone();
    let enhancer = PromptEnhancer::new(
        EnhancerConfig::new().with_api_key("test-api-key"),
        transport,
    )
    .with_interceptors(Arc::new(InterceptorRegistry::new()));

    let mut stream = enhancer
        .stream_enhancement(IDEA, &EnhancementOptions::default())
        .await
        .unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), "fragment 0");
    assert_eq!(produced.load(Ordering::SeqCst), 1);
    assert!(!released.load(Ordering::SeqCst));

    drop(stream);
    tokio::task::yield_now().await;

    assert!(released.load(Ordering::SeqCst));
    assert_eq!(produced.load(Ordering::SeqCst), 1);
}
