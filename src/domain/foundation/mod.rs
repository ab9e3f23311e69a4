//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the Pantry Chef domain.

mod auth;
mod errors;
mod identity;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::ValidationError;
pub use identity::{ClientIdentity, IdentityClass, UNKNOWN_CLIENT};
pub use ids::{RecipeId, RequestId, UserId};
pub use timestamp::Timestamp;
