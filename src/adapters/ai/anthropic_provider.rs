//! Anthropic Provider - Implementation of AIProvider for Anthropic's Messages API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key)
//!     .with_model("claude-sonnet-4-20250514")
//!     .with_base_url("https://api.anthropic.com");
//!
//! let provider = AnthropicProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Uses Server-Sent Events with Anthropic's event format. Events include
//! `message_start`, `content_block_delta`, and `message_delta`. Reads are
//! line-buffered, so an event split across network reads is parsed once
//! it is complete.

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::recipe::{SseLineBuffer, SseMessage};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionStream, FinishReason, MessageRole,
    StreamChunk,
};

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Base URL for the API (default: https://api.anthropic.com).
    pub base_url: String,
    /// Whole-request timeout, including the streamed body.
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Output cap used when the request does not set one.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Anthropic API provider implementation.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider with the given configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the messages endpoint URL.
    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts our request to Anthropic's format.
    fn to_anthropic_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        // System instructions travel in the top-level `system` field.
        let messages = request
            .messages
            .iter()
            .filter_map(|msg| {
                let role = match msg.role {
                    MessageRole::System => return None,
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                };
                Some(AnthropicMessage {
                    role: role.to_string(),
                    content: msg.content.clone(),
                })
            })
            .collect();

        AnthropicRequest {
            model: self.config.model.clone(),
            messages,
            system: request.system_prompt.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
            stream: true,
        }
    }

    /// Sends a streaming request.
    async fn send_streaming_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<Response, AIError> {
        let anthropic_request = self.to_anthropic_request(request);

        self.client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(&anthropic_request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> AIError {
        if e.is_timeout() {
            AIError::Timeout {
                timeout_secs: self.config.timeout.as_secs() as u32,
            }
        } else if e.is_connect() {
            AIError::network(format!("Connection failed: {}", e))
        } else {
            AIError::network(e.to_string())
        }
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let retry_after_header = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(
                retry_after_header.unwrap_or_else(|| Self::parse_retry_after(&error_body)),
            )),
            400 => Err(AIError::InvalidRequest(error_body)),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        let message = serde_json::from_str::<serde_json::Value>(error_body)
            .ok()
            .and_then(|parsed| {
                parsed
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            });

        if let Some(message) = message {
            if let Some(idx) = message.find("try again in ") {
                let digits: String = message[idx + 13..]
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                if let Ok(secs) = digits.parse::<u32>() {
                    return secs;
                }
            }
        }
        60
    }
}

#[async_trait]
impl AIProvider for AnthropicProvider {
    async fn stream_complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, AIError> {
        debug!(
            request_id = %request.metadata.request_id,
            model = %self.config.model,
            "opening anthropic stream"
        );
        let response = self.send_streaming_request(&request).await?;
        let response = self.handle_response_status(response).await?;

        let timeout_secs = self.config.timeout.as_secs() as u32;
        let stream = response
            .bytes_stream()
            .scan(SseLineBuffer::new(), move |lines, chunk| {
                let items = match chunk {
                    Ok(bytes) => lines
                        .push(&bytes)
                        .iter()
                        .filter_map(parse_anthropic_event)
                        .collect(),
                    Err(e) if e.is_timeout() => vec![Err(AIError::Timeout { timeout_secs })],
                    Err(e) => vec![Err(AIError::network(format!("Stream error: {}", e)))],
                };
                future::ready(Some(items))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }
}

/// Maps one Anthropic SSE message to a chunk, if it carries one.
///
/// ```text
/// event: content_block_delta
/// data: {"type":"content_block_delta","delta":{"text":"Hello"}}
/// ```
fn parse_anthropic_event(message: &SseMessage) -> Option<Result<StreamChunk, AIError>> {
    let data = message.data.as_str();
    match message.event.as_deref()? {
        "content_block_delta" => match serde_json::from_str::<ContentBlockDelta>(data) {
            Ok(delta) => delta
                .delta
                .text
                .filter(|text| !text.is_empty())
                .map(|text| Ok(StreamChunk::content(text))),
            Err(e) => Some(Err(AIError::parse(format!("content_block_delta: {}", e)))),
        },
        "message_delta" => {
            let delta = match serde_json::from_str::<MessageDelta>(data) {
                Ok(delta) => delta,
                Err(e) => return Some(Err(AIError::parse(format!("message_delta: {}", e)))),
            };
            let finish_reason = match delta.delta.stop_reason.as_deref() {
                Some("max_tokens") => FinishReason::Length,
                Some("refusal") => FinishReason::ContentFilter,
                _ => FinishReason::Stop,
            };
            Some(Ok(StreamChunk::final_chunk(finish_reason)))
        }
        "error" => {
            let message = serde_json::from_str::<StreamError>(data)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| "Stream error".to_string());
            Some(Err(AIError::unavailable(message)))
        }
        // message_start, content_block_start/stop, message_stop, ping
        _ => None,
    }
}

// ----- Anthropic API Types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ContentBlockDelta {
    delta: TextDelta,
}

#[derive(Debug, Deserialize)]
struct TextDelta {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageDelta {
    delta: MessageDeltaContent,
}

#[derive(Debug, Deserialize)]
struct MessageDeltaContent {
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    error: StreamErrorContent,
}

#[derive(Debug, Deserialize)]
struct StreamErrorContent {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::RequestId;
    use crate::ports::RequestMetadata;

    fn parse_all(raw: &[&[u8]]) -> Vec<Result<StreamChunk, AIError>> {
        let mut lines = SseLineBuffer::new();
        raw.iter()
            .flat_map(|bytes| lines.push(bytes))
            .filter_map(|m| parse_anthropic_event(&m))
            .collect()
    }

    #[test]
    fn config_builder_works() {
        let config = AnthropicConfig::new("test-key")
            .with_model("claude-3-haiku-20240307")
            .with_base_url("https://custom.api.com")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "claude-3-haiku-20240307");
        assert_eq!(config.base_url, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn request_moves_system_prompt_out_of_messages() {
        let provider = AnthropicProvider::new(AnthropicConfig::new("k")).unwrap();
        let request = CompletionRequest::new(RequestMetadata::new(RequestId::new(), "ip:1"))
            .with_message(MessageRole::System, "ignored")
            .with_message(MessageRole::User, "tomato, basil")
            .with_system_prompt("be a chef")
            .with_temperature(0.7);

        let body = serde_json::to_value(provider.to_anthropic_request(&request)).unwrap();
        assert_eq!(body["system"], "be a chef");
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn parse_sse_content_delta() {
        let chunks = parse_all(&[b"event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\n"]);

        assert_eq!(chunks.len(), 1);
        let chunk = chunks[0].as_ref().unwrap();
        assert_eq!(chunk.delta, "Hello");
        assert_eq!(chunk.finish_reason, None);
    }

    #[test]
    fn parse_sse_event_split_across_reads() {
        let chunks = parse_all(&[
            b"event: content_block_delta\ndata: {\"delta\":{\"te",
            b"xt\":\"Hi\"}}\n\nevent: content_block_delta\n",
            b"data: {\"delta\":{\"text\":\" there\"}}\n\n",
        ]);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap().delta, "Hi");
        assert_eq!(chunks[1].as_ref().unwrap().delta, " there");
    }

    #[test]
    fn parse_sse_message_delta_with_stop() {
        let chunks = parse_all(&[b"event: message_delta\ndata: {\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":50}}\n\n"]);

        let chunk = chunks[0].as_ref().unwrap();
        assert_eq!(chunk.finish_reason, Some(FinishReason::Stop));
        assert_eq!(chunk.delta, "");
    }

    #[test]
    fn parse_sse_error_event() {
        let chunks = parse_all(&[b"event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n"]);
        assert!(matches!(chunks[0], Err(AIError::Unavailable { .. })));
    }

    #[test]
    fn ping_and_stop_events_are_ignored() {
        let chunks = parse_all(&[b"event: ping\ndata: {}\n\nevent: message_stop\ndata: {}\n\n"]);
        assert!(chunks.is_empty());
    }

    #[test]
    fn parse_retry_after_from_message() {
        let error = r#"{"error":{"message":"Please try again in 12s"}}"#;
        assert_eq!(AnthropicProvider::parse_retry_after(error), 12);
    }

    #[test]
    fn parse_retry_after_default() {
        let error = r#"{"error":{"message":"Rate limit exceeded"}}"#;
        assert_eq!(AnthropicProvider::parse_retry_after(error), 60);
    }
}
