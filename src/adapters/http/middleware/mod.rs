//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `auth` - Authentication middleware and extractors
//! - `rate_limit` - Caller identification and quota response helpers

pub mod auth;
pub mod rate_limit;

pub use auth::{auth_middleware, AuthRejection, AuthState, OptionalAuth, RequireAuth};
pub use rate_limit::{add_rate_limit_headers, extract_client_ip, rate_limit_response, Caller};
