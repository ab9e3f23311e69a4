//! Streaming client for recipe generation.
//!
//! [`RecipeStreamConsumer`] opens a generation over a [`GenerationTransport`],
//! decodes the event stream and reveals the recipe with a typewriter effect.
//! Renderers subscribe to [`DisplayState`] and [`ConsumerPhase`].

mod consumer;
mod display;
mod transport;

pub use consumer::{CompletedRecipe, ConsumerConfig, ConsumerError, RecipeStreamConsumer};
pub use display::{ConsumerPhase, DisplayState};
pub use transport::{
    ByteStream, GenerationTransport, HttpGenerationTransport, MockGenerationTransport,
    TransportError,
};
