//! Mock AI Provider for tests and local development.
//!
//! Provides a configurable implementation of the AIProvider port, so the
//! generation pipeline can run without calling a real AI API.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Exact chunk boundaries for relay framing tests
//! - Failures at open time or in the middle of a stream
//! - Simulated latency per request and per chunk
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_chunks(["Recipe", " Title"])
//!     .with_chunk_delay(Duration::from_millis(10));
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionStream, FinishReason, StreamChunk,
};

/// Recipe returned when no response has been queued.
pub const MOCK_RECIPE: &str = "# Tomato Basil Bruschetta\n\n\
**Prep time:** 10 minutes\n\
**Cook time:** 5 minutes\n\
**Servings:** 4\n\n\
## Ingredients\n\
- 4 ripe tomatoes, diced\n\
- 1 handful fresh basil, torn\n\
- 3 tbsp olive oil\n\
- Salt and pepper to taste\n\n\
## Instructions\n\
1. Toss the tomatoes and basil with the olive oil.\n\
2. Season with salt and pepper and rest for 5 minutes.\n\
3. Spoon over toasted bread and serve.\n\n\
## Tips\n\
- Use the ripest tomatoes you can find.";

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Simulated latency before the stream opens.
    delay: Duration,
    /// Simulated latency before each chunk.
    chunk_delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream these deltas, then a final chunk.
    Chunks {
        chunks: Vec<String>,
        finish_reason: FinishReason,
    },
    /// Fail when the stream is opened.
    Error(MockError),
    /// Stream these deltas, then fail.
    StreamError {
        chunks: Vec<String>,
        error: MockError,
    },
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate content filtering.
    ContentFiltered { reason: String },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Splits text into word-sized deltas that concatenate back to the input.
fn word_chunks(content: &str) -> Vec<String> {
    content.split_inclusive(' ').map(str::to_string).collect()
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            chunk_delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a response streamed as word-sized chunks.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        let chunks = word_chunks(&content.into());
        self.push(MockResponse::Chunks {
            chunks,
            finish_reason: FinishReason::Stop,
        })
    }

    /// Queues a response streamed with exactly these chunk boundaries.
    pub fn with_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::Chunks {
            chunks: chunks.into_iter().map(Into::into).collect(),
            finish_reason: FinishReason::Stop,
        })
    }

    /// Queues a failure when the stream is opened.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Queues a stream that yields `chunks` and then fails.
    pub fn with_stream_error<I, S>(self, chunks: I, error: MockError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::StreamError {
            chunks: chunks.into_iter().map(Into::into).collect(),
            error,
        })
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets simulated latency before each chunk.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        locked(&self.calls).clone()
    }

    fn push(self, response: MockResponse) -> Self {
        locked(&self.responses).push_back(response);
        self
    }

    /// Gets the next response or the canned recipe.
    fn next_response(&self) -> MockResponse {
        locked(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Chunks {
                chunks: word_chunks(MOCK_RECIPE),
                finish_reason: FinishReason::Stop,
            })
    }

    fn paced(&self, items: Vec<Result<StreamChunk, AIError>>) -> CompletionStream {
        let chunk_delay = self.chunk_delay;
        Box::pin(stream::iter(items).then(move |item| async move {
            if !chunk_delay.is_zero() {
                sleep(chunk_delay).await;
            }
            item
        }))
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn stream_complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, AIError> {
        locked(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Chunks {
                chunks,
                finish_reason,
            } => {
                let mut items: Vec<Result<StreamChunk, AIError>> =
                    chunks.into_iter().map(|c| Ok(StreamChunk::content(c))).collect();
                items.push(Ok(StreamChunk::final_chunk(finish_reason)));
                Ok(self.paced(items))
            }
            MockResponse::StreamError { chunks, error } => {
                let mut items: Vec<Result<StreamChunk, AIError>> =
                    chunks.into_iter().map(|c| Ok(StreamChunk::content(c))).collect();
                items.push(Err(error.into()));
                Ok(self.paced(items))
            }
            MockResponse::Error(err) => Err(err.into()),
        }
    }
}
