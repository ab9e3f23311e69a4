//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `JwtSessionValidator` - HS256 tokens signed with a shared secret
//! - `MockSessionValidator` - token table for tests

mod jwt;
mod mock;

pub use jwt::{JwtConfig, JwtSessionValidator, SessionClaims};
pub use mock::MockSessionValidator;
