//! Generation pipeline: quota, validation, provider stream, event relay.
//!
//! ```text
//! Received → RateChecked → Validated → Streaming → Completed | Failed
//! ```
//!
//! Everything up to opening the provider stream happens before the response
//! starts, so quota and validation failures get ordinary HTTP statuses. After
//! that the relay task owns the provider stream and reports failures as a
//! terminal `error` event.

use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

use super::quota::consume_token;
use crate::domain::foundation::{ClientIdentity, RequestId};
use crate::domain::ingredient::{IngredientCatalog, IngredientList, IngredientListError};
use crate::domain::recipe::{build_recipe_prompt, StreamEvent, SYSTEM_INSTRUCTION};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionStream, FinishReason, MessageRole,
    RateLimitAction, RateLimitDenied, RateLimitStatus, RateLimiter, RequestMetadata,
};

/// How provider output is turned into stream events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayStrategy {
    /// One `chunk` per provider delta, then `complete` with the full text.
    #[default]
    Incremental,
    /// A single `complete` once the provider finishes.
    Buffered,
}

/// Fixed provider parameters and relay settings.
#[derive(Debug, Clone)]
pub struct GenerateRecipeConfig {
    pub relay_strategy: RelayStrategy,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Events buffered between the relay task and the response body.
    pub channel_capacity: usize,
}

impl Default for GenerateRecipeConfig {
    fn default() -> Self {
        Self {
            relay_strategy: RelayStrategy::Incremental,
            max_output_tokens: 2048,
            temperature: 0.7,
            channel_capacity: 32,
        }
    }
}

/// Command to generate a recipe.
#[derive(Debug, Clone)]
pub struct GenerateRecipeCommand {
    pub identity: ClientIdentity,
    /// Ingredients as submitted, before normalization.
    pub ingredients: Vec<String>,
}

impl GenerateRecipeCommand {
    pub fn new(identity: ClientIdentity, ingredients: Vec<String>) -> Self {
        Self {
            identity,
            ingredients,
        }
    }
}

/// An accepted generation whose events are being relayed.
#[derive(Debug)]
pub struct GenerationStarted {
    pub request_id: RequestId,
    /// Quota after this request; `None` when the limiter was unavailable.
    pub rate_status: Option<RateLimitStatus>,
    /// Zero or more `chunk` events followed by exactly one terminal event.
    pub events: ReceiverStream<StreamEvent>,
}

/// Failures detected before any event is sent.
#[derive(Debug, Error)]
pub enum GenerateRecipeError {
    #[error("rate limit exceeded")]
    RateLimited(RateLimitDenied),

    #[error(transparent)]
    InvalidIngredients(#[from] IngredientListError),

    #[error("provider failed to start: {0}")]
    Upstream(#[from] AIError),
}

/// Handler for recipe generation requests.
pub struct GenerateRecipeHandler {
    limiter: Arc<dyn RateLimiter>,
    provider: Arc<dyn AIProvider>,
    catalog: Arc<IngredientCatalog>,
    config: GenerateRecipeConfig,
}

impl GenerateRecipeHandler {
    pub fn new(
        limiter: Arc<dyn RateLimiter>,
        provider: Arc<dyn AIProvider>,
        catalog: Arc<IngredientCatalog>,
        config: GenerateRecipeConfig,
    ) -> Self {
        Self {
            limiter,
            provider,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &GenerateRecipeConfig {
        &self.config
    }

    /// Runs the pipeline up to the first provider byte and spawns the relay.
    pub async fn handle(
        &self,
        cmd: GenerateRecipeCommand,
    ) -> Result<GenerationStarted, GenerateRecipeError> {
        let request_id = RequestId::new();
        let span = tracing::info_span!(
            "generate_recipe",
            request_id = %request_id,
            identity = %cmd.identity,
        );

        self.run(request_id, cmd).instrument(span).await
    }

    async fn run(
        &self,
        request_id: RequestId,
        cmd: GenerateRecipeCommand,
    ) -> Result<GenerationStarted, GenerateRecipeError> {
        // 1. Quota
        let rate_status =
            consume_token(self.limiter.as_ref(), &cmd.identity, RateLimitAction::Generation)
                .await
                .map_err(GenerateRecipeError::RateLimited)?;

        // 2. Input
        let ingredients = IngredientList::parse(&cmd.ingredients, &self.catalog)?;

        // 3. Prompt and provider stream
        let request = CompletionRequest::new(RequestMetadata::new(
            request_id,
            cmd.identity.to_string(),
        ))
        .with_system_prompt(SYSTEM_INSTRUCTION)
        .with_message(MessageRole::User, build_recipe_prompt(&ingredients))
        .with_max_tokens(self.config.max_output_tokens)
        .with_temperature(self.config.temperature);

        let upstream = self.provider.stream_complete(request).await.map_err(|e| {
            tracing::error!(error = %e, "Provider stream failed to open");
            GenerateRecipeError::Upstream(e)
        })?;

        tracing::info!(
            ingredients = ingredients.len(),
            strategy = ?self.config.relay_strategy,
            "Generation started"
        );

        // 4. Relay
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        tokio::spawn(
            relay(upstream, tx, self.config.relay_strategy).instrument(tracing::Span::current()),
        );

        Ok(GenerationStarted {
            request_id,
            rate_status,
            events: ReceiverStream::new(rx),
        })
    }
}

/// Forwards provider output as stream events until a terminal event is sent
/// or the receiver goes away. Dropping `upstream` cancels the provider call.
async fn relay(
    mut upstream: CompletionStream,
    tx: mpsc::Sender<StreamEvent>,
    strategy: RelayStrategy,
) {
    let mut full_text = String::new();

    loop {
        let next = tokio::select! {
            _ = tx.closed() => {
                tracing::debug!("Client disconnected, abandoning generation");
                return;
            }
            next = upstream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                let finish_reason = chunk.finish_reason;
                if !chunk.delta.is_empty() {
                    full_text.push_str(&chunk.delta);
                    if strategy == RelayStrategy::Incremental
                        && tx.send(StreamEvent::chunk(chunk.delta)).await.is_err()
                    {
                        tracing::debug!("Client disconnected mid-stream");
                        return;
                    }
                }
                match finish_reason {
                    Some(FinishReason::ContentFilter) => {
                        let err = AIError::content_filtered("finish reason");
                        tracing::warn!(error = %err, "Provider filtered the recipe");
                        let _ = tx.send(StreamEvent::error(err.user_message())).await;
                        return;
                    }
                    Some(_) => break,
                    None => {}
                }
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, received = full_text.len(), "Provider stream failed");
                let _ = tx.send(StreamEvent::error(e.user_message())).await;
                return;
            }
            None => break,
        }
    }

    let terminal = if full_text.trim().is_empty() {
        let err = AIError::unavailable("provider returned no text");
        tracing::warn!(error = %err, "Empty generation");
        StreamEvent::error(err.user_message())
    } else {
        tracing::info!(chars = full_text.chars().count(), "Generation complete");
        StreamEvent::complete(full_text)
    };
    let _ = tx.send(terminal).await;
}
