//! Rate limiter adapters.
//!
//! Implementations of the RateLimiter port.
//!
//! ## Usage
//!
//! ```ignore
//! use pantry_chef::adapters::rate_limiter::{InMemoryRateLimiter, WindowLimits};
//!
//! // One instance per action; they never share counters.
//! let generation = InMemoryRateLimiter::new(WindowLimits::generation());
//! let validation = InMemoryRateLimiter::new(WindowLimits::validation());
//! ```

mod config;
mod in_memory;

pub use config::WindowLimits;
pub use in_memory::{InMemoryRateLimiter, DEFAULT_SWEEP_THRESHOLD};
