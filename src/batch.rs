//! Concurrent enhancement of several requests.

use futures::stream::{self, StreamExt};
use validator::Validate;

use crate::enhancer::PromptEnhancer;
use crate::error::EnhanceError;
use crate::prompt::EnhancementRequest;

/// Default number of requests in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Enhance every request with at most `limit` in flight, returning results in
/// input order. Requests failing validation are rejected without a call.
pub async fn enhance_all(
    enhancer: &PromptEnhancer,
    requests: Vec<EnhancementRequest>,
    limit: usize,
) -> Vec<Result<String, EnhanceError>> {
    let total = requests.len();
    tracing::debug!(target: "devprompt::enhancer", total, limit, "starting batch");

    stream::iter(requests)
        .map(|request| async move {
            if let Err(e) = request.validate() {
                return Err(EnhanceError::from(e));
            }
            enhancer.enhance(&request.input, &request.options).await
        })
        .buffered(limit.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnhancerConfig;
    use crate::interceptor::InterceptorRegistry;
    use crate::prompt::{ComposedPayload, EnhancementOptions};
    use crate::transport::{ChunkStream, GenerativeTransport, StreamChunk};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Echoes the first word of the idea back after a delay that shrinks with
    /// each call, so later requests finish first.
    #[derive(Default)]
    struct EchoTransport {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl GenerativeTransport for EchoTransport {
        async fn open_stream(&self, payload: &ComposedPayload) -> Result<ChunkStream, EnhanceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            tokio::time::sleep(Duration::from_millis(40u64.saturating_sub(n * 10))).await;
            let idea = payload
                .contents
                .lines()
                .nth(1)
                .unwrap_or_default()
                .trim_matches('"')
                .to_string();
            Ok(Box::pin(futures::stream::iter(vec![Ok::<_, EnhanceError>(StreamChunk::text(idea))])))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn results_keep_input_order_and_reject_invalid_requests() {
        let transport = Arc::new(EchoTransport::default());
        let enhancer = PromptEnhancer::new(EnhancerConfig::new().with_api_key("k"), transport.clone())
            .with_interceptors(Arc::new(InterceptorRegistry::new()));

        let requests = vec![
            EnhancementRequest::new("first idea for an app", EnhancementOptions::default()),
            EnhancementRequest::new("short", EnhancementOptions::default()),
            EnhancementRequest::new("third idea for an app", EnhancementOptions::default()),
        ];
        let results = enhance_all(&enhancer, requests, 3).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_deref().unwrap(), "first idea for an app");
        let rejected = results[1].as_ref().unwrap_err();
        assert!(matches!(rejected, EnhanceError::ValidationError(_)));
        assert_eq!(rejected.kind(), crate::error::ErrorKind::InvalidRequest);
        assert_eq!(results[2].as_deref().unwrap(), "third idea for an app");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }
}
