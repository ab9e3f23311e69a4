//! Recipe module - generation prompts, stream events and saved recipes.

mod framing;
mod prompt;
mod saved;
mod stream_event;
mod title;

pub use framing::{FrameDecoder, SseLineBuffer, SseMessage};
pub use prompt::{build_recipe_prompt, SYSTEM_INSTRUCTION};
pub use saved::{SavedRecipe, UNTITLED_RECIPE};
pub use stream_event::{StreamEvent, StreamFrame};
pub use title::extract_title;
