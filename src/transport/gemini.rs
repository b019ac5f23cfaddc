//! Gemini streaming transport
//!
//! Calls `models/{model}:streamGenerateContent?alt=sse` and parses each SSE
//! `data:` payload as a `GenerateContentResponse` chunk.

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{ChunkStream, GenerativeTransport, StreamChunk};
use crate::config::EnhancerConfig;
use crate::error::EnhanceError;
use crate::prompt::{ComposedPayload, GenerationParams};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: &'a GenerationParams,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_payload(payload: &'a ComposedPayload) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &payload.contents,
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &payload.system_instruction,
                }],
            },
            generation_config: &payload.generation,
        }
    }
}

/// Gemini stream response structure
#[derive(Debug, Deserialize)]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
    /// Thought summaries from thinking models are not part of the answer.
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

impl GeminiStreamResponse {
    /// Answer text of the first candidate, thought parts excluded.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }

    fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}

/// Message from a Gemini error body, falling back to the raw body.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<GeminiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

/// Parse one SSE payload into a chunk.
fn parse_chunk(data: &str) -> Result<StreamChunk, EnhanceError> {
    let response: GeminiStreamResponse = serde_json::from_str(data)
        .map_err(|e| EnhanceError::ParseError(format!("Failed to parse Gemini SSE JSON: {e}")))?;

    if let Some(error) = response.error {
        return Err(EnhanceError::TransportError {
            status: error.code,
            message: error.message,
            network: false,
        });
    }
    if let Some(reason) = response.finish_reason() {
        tracing::debug!(target: "devprompt::transport", finish_reason = reason, "stream finished");
    }
    Ok(StreamChunk {
        text: response.text(),
    })
}

/// Streaming client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiTransport {
    http_client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiTransport {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            api_key,
            timeout: None,
        }
    }

    /// Limit the wait for response headers and the gap between two SSE
    /// events. The stream as a whole is not bounded.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a transport with its own HTTP client from configuration.
    ///
    /// A missing key yields an empty one; the executor rejects that before
    /// any request is made.
    pub fn from_config(config: &EnhancerConfig) -> Result<Self, EnhanceError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let api_key = config
            .api_key
            .clone()
            .unwrap_or_else(|| SecretString::from(String::new()));
        Ok(Self::new(http_client, config.base_url.clone(), api_key).with_timeout(config.timeout))
    }

    pub fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl GenerativeTransport for GeminiTransport {
    async fn open_stream(&self, payload: &ComposedPayload) -> Result<ChunkStream, EnhanceError> {
        let url = self.stream_url(&payload.model);
        let body = GenerateContentRequest::from_payload(payload);

        tracing::debug!(target: "devprompt::transport", provider = "gemini", %url, "opening stream");
        let request = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send();
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                EnhanceError::network(format!(
                    "request timeout: no response within {}ms",
                    limit.as_millis()
                ))
            })??,
            None => request.await?,
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text, status);
            tracing::debug!(target: "devprompt::transport", status = status.as_u16(), %message, "stream rejected");
            return Err(EnhanceError::transport(status.as_u16(), message));
        }

        let idle_limit = self.timeout;
        let stream = async_stream::stream! {
            let mut events = std::pin::pin!(response.bytes_stream().eventsource());
            loop {
                let next = match idle_limit {
                    Some(limit) => match tokio::time::timeout(limit, events.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            yield Err(EnhanceError::network(format!(
                                "stream stalled: no event within {}ms",
                                limit.as_millis()
                            )));
                            return;
                        }
                    },
                    None => events.next().await,
                };
                let Some(item) = next else {
                    break;
                };
                let event = match item {
                    Ok(event) => event,
                    Err(EventStreamError::Transport(e)) => {
                        yield Err(EnhanceError::from(e));
                        return;
                    }
                    Err(e) => {
                        yield Err(EnhanceError::StreamError(format!("SSE parsing error: {e}")));
                        return;
                    }
                };

                let data = event.data.trim();
                if data.is_empty() || data == "[DONE]" {
                    continue;
                }

                match parse_chunk(data) {
                    Ok(chunk) => yield Ok(chunk),
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
