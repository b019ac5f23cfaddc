//! Streaming Request Executor
//!
//! [`PromptEnhancer`] runs one enhancement end to end: credential check,
//! prompt assembly, request interceptors, retry-wrapped stream establishment,
//! and per-fragment response interceptors. Terminal failures go through the
//! error interceptors and are then classified.
//!
//! Retries cover only establishing the stream. Once the transport has
//! accepted the request, fragments are delivered as they arrive and a later
//! failure ends the stream without another attempt, so output from two
//! attempts is never mixed.

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use futures_util::StreamExt;
use tracing::Instrument;
use uuid::Uuid;

use crate::cancel::CancelHandle;
use crate::config::EnhancerConfig;
use crate::error::{EnhanceError, classify};
use crate::interceptor::InterceptorRegistry;
use crate::prompt::{ComposedPayload, EnhancementOptions, assemble_with};
use crate::retry::RetryExecutor;
use crate::transport::{GeminiTransport, GenerativeTransport};

/// Fragments of generated text in arrival order. Finite, single-pass, and
/// pulled by the consumer; dropping it releases the underlying connection.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, EnhanceError>> + Send>>;

/// Prompt enhancement client.
#[derive(Clone)]
pub struct PromptEnhancer {
    config: EnhancerConfig,
    transport: Arc<dyn GenerativeTransport>,
    interceptors: Arc<InterceptorRegistry>,
    retry: RetryExecutor,
}

static_assertions::assert_impl_all!(PromptEnhancer: Send, Sync, Clone);

impl std::fmt::Debug for PromptEnhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptEnhancer")
            .field("config", &self.config)
            .field("transport", &self.transport.name())
            .field("interceptors", &self.interceptors)
            .finish()
    }
}

impl PromptEnhancer {
    /// Create an enhancer over `transport` using the global interceptor
    /// registry.
    pub fn new(config: EnhancerConfig, transport: Arc<dyn GenerativeTransport>) -> Self {
        let retry = RetryExecutor::new(config.retry.clone());
        Self {
            config,
            transport,
            interceptors: InterceptorRegistry::global(),
            retry,
        }
    }

    /// Create an enhancer talking to Gemini.
    pub fn gemini(config: EnhancerConfig) -> Result<Self, EnhanceError> {
        let transport = GeminiTransport::from_config(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Create a Gemini enhancer configured from the environment.
    pub fn from_env() -> Result<Self, EnhanceError> {
        Self::gemini(EnhancerConfig::from_env())
    }

    pub fn builder() -> PromptEnhancerBuilder {
        PromptEnhancerBuilder::default()
    }

    /// Replace the interceptor registry (the global one by default).
    pub fn with_interceptors(mut self, interceptors: Arc<InterceptorRegistry>) -> Self {
        self.interceptors = interceptors;
        self
    }

    pub fn config(&self) -> &EnhancerConfig {
        &self.config
    }

    pub fn interceptors(&self) -> &Arc<InterceptorRegistry> {
        &self.interceptors
    }

    /// Assemble the payload for `raw_input` and run it through the request
    /// interceptors, exactly as it would be sent.
    pub fn compose(&self, raw_input: &str, options: &EnhancementOptions) -> ComposedPayload {
        let payload = assemble_with(raw_input, options, &self.config.models);
        self.interceptors.apply_request(payload)
    }

    /// Start an enhancement and return its fragment stream.
    pub async fn stream_enhancement(
        &self,
        raw_input: &str,
        options: &EnhancementOptions,
    ) -> Result<FragmentStream, EnhanceError> {
        self.stream_enhancement_with_cancel(raw_input, options, CancelHandle::new())
            .await
    }

    /// Like [`stream_enhancement`](Self::stream_enhancement), stopping retries
    /// and the stream once `cancel` fires.
    pub async fn stream_enhancement_with_cancel(
        &self,
        raw_input: &str,
        options: &EnhancementOptions,
        cancel: CancelHandle,
    ) -> Result<FragmentStream, EnhanceError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            target: "devprompt::enhancer",
            "enhancement",
            %request_id,
            model = tracing::field::Empty,
            mode = options.mode.wire_name(),
            thinking = options.use_thinking,
        );

        if !self.config.has_api_key() {
            let model = if options.use_thinking {
                &self.config.models.reasoning_model
            } else {
                &self.config.models.standard_model
            };
            let error = self.fail(
                EnhanceError::ConfigurationError(
                    "API key is not configured: set GEMINI_API_KEY.".to_string(),
                ),
                model,
            );
            span.in_scope(|| {
                tracing::error!(target: "devprompt::enhancer", err = %error, "missing credential")
            });
            return Err(error);
        }

        let payload = self.compose(raw_input, options);
        let model = payload.model.clone();
        span.record("model", model.as_str());

        let chunks = self
            .retry
            .execute_cancellable(|| self.transport.open_stream(&payload), &cancel)
            .instrument(span.clone())
            .await;

        let mut chunks = match chunks {
            Ok(chunks) => chunks,
            Err(error) => {
                let error = self.fail(error, &model);
                span.in_scope(|| {
                    tracing::warn!(
                        target: "devprompt::enhancer",
                        %model,
                        kind = %error.kind(),
                        err = %error,
                        "enhancement failed"
                    )
                });
                return Err(error);
            }
        };
        span.in_scope(|| {
            tracing::info!(target: "devprompt::enhancer", %model, provider = self.transport.name(), "stream established")
        });

        let interceptors = self.interceptors.clone();
        let stream = async_stream::stream! {
            let mut delivered = 0usize;
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Some(Err(EnhanceError::Cancelled)),
                    item = chunks.next() => item,
                };

                match next {
                    None => break,
                    Some(Ok(chunk)) => {
                        let Some(text) = chunk.text.filter(|t| !t.is_empty()) else {
                            continue;
                        };
                        delivered += 1;
                        yield Ok(interceptors.apply_response(text));
                    }
                    Some(Err(error)) => {
                        let error = classify(interceptors.apply_error(error), &model);
                        tracing::warn!(
                            target: "devprompt::enhancer",
                            %request_id,
                            delivered,
                            kind = %error.kind(),
                            err = %error,
                            "stream ended with error"
                        );
                        yield Err(error);
                        break;
                    }
                }
            }
            tracing::debug!(target: "devprompt::enhancer", %request_id, delivered, "stream closed");
        };

        Ok(Box::pin(stream))
    }

    /// Run an enhancement to completion and return the concatenated text.
    pub async fn enhance(
        &self,
        raw_input: &str,
        options: &EnhancementOptions,
    ) -> Result<String, EnhanceError> {
        let mut stream = self.stream_enhancement(raw_input, options).await?;
        let mut text = String::new();
        while let Some(fragment) = stream.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }

    fn fail(&self, error: EnhanceError, model: &str) -> EnhanceError {
        classify(self.interceptors.apply_error(error), model)
    }
}

/// Builder for [`PromptEnhancer`].
#[derive(Default)]
pub struct PromptEnhancerBuilder {
    config: EnhancerConfig,
    transport: Option<Arc<dyn GenerativeTransport>>,
    interceptors: Option<Arc<InterceptorRegistry>>,
}

impl PromptEnhancerBuilder {
    pub fn config(mut self, config: EnhancerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config = self.config.with_api_key(api_key);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.with_base_url(base_url);
        self
    }

    pub fn retry(mut self, retry: crate::retry::RetryPolicy) -> Self {
        self.config = self.config.with_retry(retry);
        self
    }

    /// Use a custom transport instead of Gemini.
    pub fn transport(mut self, transport: Arc<dyn GenerativeTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use an isolated interceptor registry instead of the global one.
    pub fn interceptors(mut self, interceptors: Arc<InterceptorRegistry>) -> Self {
        self.interceptors = Some(interceptors);
        self
    }

    pub fn build(self) -> Result<PromptEnhancer, EnhanceError> {
        let transport: Arc<dyn GenerativeTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(GeminiTransport::from_config(&self.config)?),
        };
        let enhancer = PromptEnhancer::new(self.config, transport);
        Ok(match self.interceptors {
            Some(interceptors) => enhancer.with_interceptors(interceptors),
            None => enhancer,
        })
    }
}
