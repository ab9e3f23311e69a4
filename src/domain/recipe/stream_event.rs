//! Events relayed from the generation pipeline to the client.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// One unit of a generation stream.
///
/// A stream is zero or more `Chunk`s followed by exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Chunk { content: String },
    Complete { content: String },
    Error { message: String },
}

impl StreamEvent {
    pub fn chunk(content: impl Into<String>) -> Self {
        Self::Chunk {
            content: content.into(),
        }
    }

    pub fn complete(content: impl Into<String>) -> Self {
        Self::Complete {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// `complete` and `error` end the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Chunk { .. })
    }
}

/// Wire form of a [`StreamEvent`]: the event fields plus an emission timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFrame {
    #[serde(flatten)]
    pub event: StreamEvent,
    pub timestamp: String,
}

impl StreamFrame {
    pub fn new(event: StreamEvent) -> Self {
        Self::at(event, Timestamp::now())
    }

    pub fn at(event: StreamEvent, timestamp: Timestamp) -> Self {
        Self {
            event,
            timestamp: timestamp.to_rfc3339(),
        }
    }

    /// Frame as JSON, the payload of one SSE `data:` line.
    pub fn to_json(&self) -> String {
        // Only string fields, serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Complete SSE frame: `data: <json>\n\n`.
    pub fn to_sse_frame(&self) -> String {
        format!("data: {}\n\n", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_serializes_with_type_tag() {
        let frame = StreamFrame::at(StreamEvent::chunk("Recipe"), Timestamp::from_unix_secs(0));
        let json: serde_json::Value = serde_json::from_str(&frame.to_json()).unwrap();
        assert_eq!(json["type"], "chunk");
        assert_eq!(json["content"], "Recipe");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn error_uses_message_field() {
        let json = serde_json::to_value(StreamFrame::new(StreamEvent::error("boom"))).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "boom");
        assert!(json.get("content").is_none());
    }

    #[test]
    fn sse_frame_is_data_line_and_blank_line() {
        let frame = StreamFrame::new(StreamEvent::complete("done")).to_sse_frame();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("}\n\n"));
    }

    #[test]
    fn parses_wire_json() {
        let frame: StreamFrame = serde_json::from_str(
            r#"{"type":"complete","content":"Soup","timestamp":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(frame.event, StreamEvent::complete("Soup"));
        assert!(frame.event.is_terminal());
    }
}
