//! HTTP adapter for the streaming generation endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::GenerateRequest;
pub use handlers::GenerationHandlers;
pub use routes::generation_routes;
