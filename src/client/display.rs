//! Observable state of the streaming consumer.

/// What a renderer shows for the current request.
///
/// `displayed_prefix` is always a prefix of `full_text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Text received so far; replaced by the authoritative text on completion.
    pub full_text: String,
    /// Text revealed by the typewriter.
    pub displayed_prefix: String,
    pub cursor_visible: bool,
    pub is_typing: bool,
}

impl DisplayState {
    /// Reveals the next character, returning false when fully revealed.
    pub(crate) fn reveal_next(&mut self) -> bool {
        match self
            .full_text
            .get(self.displayed_prefix.len()..)
            .and_then(|rest| rest.chars().next())
        {
            Some(ch) => {
                self.displayed_prefix.push(ch);
                true
            }
            None => false,
        }
    }

    /// Replaces the text, keeping revealed characters when they still match.
    pub(crate) fn replace_text(&mut self, text: String) {
        if !text.starts_with(&self.displayed_prefix) {
            self.displayed_prefix.clear();
        }
        self.full_text = text;
    }

    /// Stops the typewriter and hides the cursor.
    pub(crate) fn stop_typing(&mut self) {
        self.is_typing = false;
        self.cursor_visible = false;
    }
}

/// Lifecycle of one generate call.
///
/// ```text
/// Idle → Requesting → Streaming → Typewriting → Done | Cancelled | Errored
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsumerPhase {
    #[default]
    Idle,
    Requesting,
    Streaming,
    Typewriting,
    Done,
    Cancelled,
    Errored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveals_multibyte_characters_whole() {
        let mut state = DisplayState {
            full_text: "Crème brûlée".to_string(),
            ..Default::default()
        };
        for _ in 0..3 {
            assert!(state.reveal_next());
        }
        assert_eq!(state.displayed_prefix, "Crè");
        while state.reveal_next() {}
        assert_eq!(state.displayed_prefix, state.full_text);
    }

    #[test]
    fn consistent_replacement_keeps_progress() {
        let mut state = DisplayState {
            full_text: "Recipe".to_string(),
            displayed_prefix: "Rec".to_string(),
            ..Default::default()
        };
        state.replace_text("Recipe Title".to_string());
        assert_eq!(state.displayed_prefix, "Rec");
    }

    #[test]
    fn divergent_replacement_restarts_reveal() {
        let mut state = DisplayState {
            full_text: "Recipe".to_string(),
            displayed_prefix: "Rec".to_string(),
            ..Default::default()
        };
        state.replace_text("Soup".to_string());
        assert_eq!(state.displayed_prefix, "");
    }
}
