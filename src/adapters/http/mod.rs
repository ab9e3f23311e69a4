//! HTTP adapters - REST and SSE endpoints.
//!
//! Each feature has its own module with dto, handlers and routes; `router`
//! assembles them behind the shared middleware.

pub mod error;
pub mod generation;
pub mod ingredients;
pub mod middleware;
pub mod recipes;
mod router;

pub use error::{ApiError, ErrorResponse};
pub use router::{build_router, AppServices};
