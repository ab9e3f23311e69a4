//! Rate limiting port for protecting the generation and validation endpoints.
//!
//! Counters are fixed-window: each key may consume `limit` tokens per window,
//! and the window restarts lazily on the first touch after it elapses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ClientIdentity, IdentityClass, Timestamp};

/// Port for rate limiting operations.
///
/// Implementations must be thread-safe; increment-and-check is atomic per key.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if request is allowed, consuming a token if so.
    ///
    /// Returns `Allowed` with remaining quota or `Denied` with retry info.
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError>;
}

/// Key identifying one counter.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    /// Whether the identifier is an address or an account.
    pub scope: RateLimitScope,
    /// IP address or user ID.
    pub identifier: String,
    /// The operation being limited.
    pub action: RateLimitAction,
}

/// The scope at which rate limiting is applied.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    /// Per client address (guests).
    Ip,
    /// Per authenticated user.
    User,
}

/// Rate-limited operations. Each has its own counters and limits.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitAction {
    Generation,
    Validation,
}

impl RateLimitKey {
    /// Creates an IP-based rate limit key.
    pub fn ip(ip: &str, action: RateLimitAction) -> Self {
        Self {
            scope: RateLimitScope::Ip,
            identifier: ip.to_string(),
            action,
        }
    }

    /// Creates a user-based rate limit key.
    pub fn user(user_id: &str, action: RateLimitAction) -> Self {
        Self {
            scope: RateLimitScope::User,
            identifier: user_id.to_string(),
            action,
        }
    }

    /// Key for a resolved client identity.
    pub fn for_identity(identity: &ClientIdentity, action: RateLimitAction) -> Self {
        match identity.class() {
            IdentityClass::Authenticated => Self::user(identity.identifier(), action),
            IdentityClass::Guest => Self::ip(identity.identifier(), action),
        }
    }

    /// Identity class the limits are chosen by.
    pub fn class(&self) -> IdentityClass {
        match self.scope {
            RateLimitScope::Ip => IdentityClass::Guest,
            RateLimitScope::User => IdentityClass::Authenticated,
        }
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.action, self.scope, self.identifier)
    }
}

impl RateLimitScope {
    /// Returns the string representation of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitScope::Ip => "ip",
            RateLimitScope::User => "user",
        }
    }
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl RateLimitAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitAction::Generation => "generation",
            RateLimitAction::Validation => "validation",
        }
    }
}

impl fmt::Display for RateLimitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed; includes current status.
    Allowed(RateLimitStatus),
    /// Request is denied; includes denial details.
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    /// Returns true if the request was allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }

    /// Returns true if the request was denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, RateLimitResult::Denied(_))
    }
}

/// Current rate limit status.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitStatus {
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Remaining requests in the current window.
    pub remaining: u32,
    /// When the current window resets.
    pub reset_at: Timestamp,
    /// Window duration in seconds.
    pub window_secs: u32,
}

/// Details of a rate limit denial.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitDenied {
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Seconds until the client should retry, at least 1.
    pub retry_after_secs: u32,
    /// When the current window resets.
    pub reset_at: Timestamp,
    /// The scope that triggered the denial.
    pub scope: RateLimitScope,
    /// Human-readable message explaining the denial.
    pub message: String,
}

/// Errors that can occur during rate limiting operations.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Rate limiter backend is unavailable.
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}
