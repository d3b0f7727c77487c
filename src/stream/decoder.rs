//! Incremental server-sent-event decoder
//!
//! Chunks arrive at arbitrary byte boundaries, including in the middle of a
//! multi-byte UTF-8 sequence. Lines are split on raw `\n` bytes and only
//! complete lines are decoded as text.

use serde_json::Value;
use tracing::{debug, warn};

/// One decoded `data:` payload and the event name in effect for it
#[derive(Debug, Clone, PartialEq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: Value,
}

/// Line-oriented SSE decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every frame completed by it
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(frame) = self.decode_line(&line[..line.len() - 1]) {
                frames.push(frame);
            }
        }

        frames
    }

    /// Decode whatever is left in the buffer as a final line
    pub fn finish(&mut self) -> Vec<SseFrame> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line).into_iter().collect()
    }

    /// Bytes held back waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<SseFrame> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);

        if let Some(name) = line.strip_prefix("event:") {
            self.event = Some(name.trim().to_string());
            return None;
        }

        let payload = line.strip_prefix("data:")?.trim();
        if payload.is_empty() || payload == "[DONE]" {
            return None;
        }

        match serde_json::from_str::<Value>(payload) {
            Ok(data) => Some(SseFrame {
                event: self.event.clone(),
                data,
            }),
            Err(e) => {
                warn!(error = %e, len = payload.len(), "decode_line: skipping malformed data line");
                debug!(%payload, "decode_line: malformed payload");
                None
            }
        }
    }
}
