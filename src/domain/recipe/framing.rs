//! Incremental Server-Sent Events decoding.
//!
//! Reads arrive in arbitrary pieces: several events per read, one event
//! split across reads, or a multi-byte character split across reads.
//! Bytes are buffered until a full line is available, so UTF-8 is only
//! decoded on complete lines.

use tracing::warn;

use super::stream_event::{StreamEvent, StreamFrame};

/// One dispatched SSE message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseMessage {
    /// Value of the last `event:` field, if any.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
}

/// Line-buffered SSE parser over raw bytes.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one read and returns every message completed by it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseMessage> {
        self.pending.extend_from_slice(bytes);
        let mut messages = Vec::new();

        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(message) = self.process_line(&line) {
                messages.push(message);
            }
        }

        messages
    }

    /// Flushes a trailing message at end of stream.
    ///
    /// A final line without a newline is treated as complete.
    pub fn finish(&mut self) -> Option<SseMessage> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            let line = String::from_utf8_lossy(&rest).into_owned();
            if let Some(message) = self.process_line(line.trim_end_matches('\r')) {
                return Some(message);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseMessage> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        if self.data.is_empty() {
            self.event = None;
            return None;
        }
        Some(SseMessage {
            event: self.event.take(),
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }
}

/// Decodes generation frames from a byte stream.
///
/// Messages whose payload is not a valid frame are logged and skipped.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    lines: SseLineBuffer,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.lines
            .push(bytes)
            .into_iter()
            .filter_map(|message| decode(&message))
            .collect()
    }

    pub fn finish(&mut self) -> Option<StreamEvent> {
        self.lines.finish().and_then(|message| decode(&message))
    }
}

fn decode(message: &SseMessage) -> Option<StreamEvent> {
    match serde_json::from_str::<StreamFrame>(&message.data) {
        Ok(frame) => Some(frame.event),
        Err(error) => {
            warn!(%error, payload_len = message.data.len(), "skipping malformed stream frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: StreamEvent) -> String {
        StreamFrame::new(event).to_sse_frame()
    }

    #[test]
    fn parses_multiple_frames_in_one_read() {
        let mut decoder = FrameDecoder::new();
        let bytes = format!(
            "{}{}",
            frame(StreamEvent::chunk("Recipe")),
            frame(StreamEvent::chunk(" Title"))
        );
        assert_eq!(
            decoder.push(bytes.as_bytes()),
            vec![StreamEvent::chunk("Recipe"), StreamEvent::chunk(" Title")]
        );
    }

    #[test]
    fn reassembles_frame_split_across_reads() {
        let mut decoder = FrameDecoder::new();
        let bytes = frame(StreamEvent::complete("Recipe Title"));
        let (a, b) = bytes.as_bytes().split_at(bytes.len() / 2);
        assert!(decoder.push(a).is_empty());
        assert_eq!(decoder.push(b), vec![StreamEvent::complete("Recipe Title")]);
    }

    #[test]
    fn multibyte_char_split_across_reads_survives() {
        let mut decoder = FrameDecoder::new();
        let bytes = frame(StreamEvent::chunk("jalapeño"));
        let split = bytes.find('ñ').unwrap() + 1;
        let (a, b) = bytes.as_bytes().split_at(split);
        assert!(decoder.push(a).is_empty());
        assert_eq!(decoder.push(b), vec![StreamEvent::chunk("jalapeño")]);
    }

    #[test]
    fn malformed_frame_is_skipped() {
        let mut decoder = FrameDecoder::new();
        let bytes = format!("data: {{not json\n\n{}", frame(StreamEvent::chunk("ok")));
        assert_eq!(decoder.push(bytes.as_bytes()), vec![StreamEvent::chunk("ok")]);
    }

    #[test]
    fn tracks_event_field_and_crlf() {
        let mut lines = SseLineBuffer::new();
        let messages = lines.push(b"event: message_stop\r\ndata: {}\r\n\r\n: comment\n\n");
        assert_eq!(
            messages,
            vec![SseMessage {
                event: Some("message_stop".into()),
                data: "{}".into(),
            }]
        );
    }

    #[test]
    fn finish_flushes_unterminated_message() {
        let mut lines = SseLineBuffer::new();
        assert!(lines.push(b"data: tail").is_empty());
        assert_eq!(
            lines.finish(),
            Some(SseMessage {
                event: None,
                data: "tail".into(),
            })
        );
    }
}
