//! Transport port for the streaming client, with reqwest and scripted
//! implementations.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use reqwest::{header::RETRY_AFTER, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Raw response body, in whatever pieces the network delivers.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Failures before or while reading a generation response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server refused with 429.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u32,
        message: String,
    },

    /// The server refused the request (validation or server error).
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Connection failed or dropped.
    #[error("network error: {0}")]
    Network(String),
}

/// Opens a generation stream for an ingredient list.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn open(&self, ingredients: &[String]) -> Result<ByteStream, TransportError>;
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    retry_after: Option<u32>,
}

/// `POST /api/generate` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGenerationTransport {
    client: reqwest::Client,
    endpoint: String,
    token: Option<Secret<String>>,
}

impl HttpGenerationTransport {
    /// Creates a transport for the server at `base_url`.
    ///
    /// `connect_timeout` bounds connection setup only; the stream itself may
    /// run as long as the server keeps sending.
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
            token: None,
        })
    }

    /// Sends the bearer token with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(Secret::new(token.into()));
        self
    }
}

#[async_trait]
impl GenerationTransport for HttpGenerationTransport {
    async fn open(&self, ingredients: &[String]) -> Result<ByteStream, TransportError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&serde_json::json!({ "ingredients": ingredients }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| TransportError::Network(e.to_string())));
            return Ok(Box::pin(body));
        }

        let header_retry = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        let body: Option<ErrorBody> = response.json().await.ok();

        Err(rejection(status, header_retry, body))
    }
}

fn rejection(status: StatusCode, header_retry: Option<u32>, body: Option<ErrorBody>) -> TransportError {
    let (error, message, body_retry) = match body {
        Some(b) => (b.error, b.message, b.retry_after),
        None => (None, None, None),
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        return TransportError::RateLimited {
            retry_after_secs: header_retry.or(body_retry).unwrap_or(1).max(1),
            message: message
                .or(error)
                .unwrap_or_else(|| "Too many requests".to_string()),
        };
    }

    TransportError::Rejected {
        status: status.as_u16(),
        message: error
            .or(message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string()),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scripted
// ════════════════════════════════════════════════════════════════════════════

enum Scripted {
    Body(Vec<Bytes>),
    Live(mpsc::Receiver<Result<Bytes, TransportError>>),
    Reject(TransportError),
}

/// Transport that replays queued responses in order.
///
/// # Example
///
/// ```ignore
/// let (tx, rx) = tokio::sync::mpsc::channel(8);
/// let transport = MockGenerationTransport::new().with_live_stream(rx);
/// tx.send(Ok(Bytes::from("data: {\"type\":\"chunk\",\"content\":\"Hi\"}\n\n"))).await?;
/// ```
#[derive(Default)]
pub struct MockGenerationTransport {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Vec<String>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockGenerationTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a body delivered in exactly these pieces.
    pub fn with_body<I, B>(self, pieces: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.push(Scripted::Body(pieces.into_iter().map(Into::into).collect()))
    }

    /// Queues a body fed by the test through a channel.
    pub fn with_live_stream(self, rx: mpsc::Receiver<Result<Bytes, TransportError>>) -> Self {
        self.push(Scripted::Live(rx))
    }

    /// Queues a refusal.
    pub fn with_rejection(self, error: TransportError) -> Self {
        self.push(Scripted::Reject(error))
    }

    /// Ingredient lists of every `open` call so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        locked(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }

    fn push(self, response: Scripted) -> Self {
        locked(&self.responses).push_back(response);
        self
    }
}

#[async_trait]
impl GenerationTransport for MockGenerationTransport {
    async fn open(&self, ingredients: &[String]) -> Result<ByteStream, TransportError> {
        locked(&self.calls).push(ingredients.to_vec());

        let next = locked(&self.responses).pop_front();
        match next {
            Some(Scripted::Body(pieces)) => Ok(Box::pin(stream::iter(
                pieces.into_iter().map(Ok::<Bytes, TransportError>),
            ))),
            Some(Scripted::Live(rx)) => Ok(Box::pin(ReceiverStream::new(rx))),
            Some(Scripted::Reject(err)) => Err(err),
            None => Err(TransportError::Network("no scripted response".to_string())),
        }
    }
}
