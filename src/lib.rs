//! Pantry Chef - streamed recipe generation from pantry ingredients
//!
//! Validates an ingredient list, asks a language model for a recipe and
//! relays the text to the browser as Server-Sent Events. A client-side
//! consumer renders the stream with a typewriter effect, and finished
//! recipes can be saved per user.

pub mod adapters;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;
