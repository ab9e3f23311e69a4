//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - streaming completions from an LLM vendor
//! - `RateLimiter` - fixed-window quotas per identity and action
//! - `SessionValidator` - bearer token to authenticated user
//! - `RecipeRepository` - saved recipe persistence

mod ai_provider;
mod rate_limiter;
mod recipe_repository;
mod session_validator;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionStream, FinishReason, Message, MessageRole,
    RequestMetadata, StreamChunk,
};
pub use rate_limiter::{
    RateLimitAction, RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult,
    RateLimitScope, RateLimitStatus, RateLimiter,
};
pub use recipe_repository::{RecipeRepository, RecipeStoreError};
pub use session_validator::SessionValidator;
