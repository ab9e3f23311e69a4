//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Anthropic streaming provider and a scripted mock
//! - `auth` - JWT session validation
//! - `http` - axum routes, middleware and error mapping
//! - `rate_limiter` - In-memory fixed-window counters
//! - `recipe_store` - In-memory saved recipe repository

pub mod ai;
pub mod auth;
pub mod http;
pub mod rate_limiter;
pub mod recipe_store;
