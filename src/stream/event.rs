//! Typed view of completion stream frames

use serde_json::Value;
use tracing::debug;

use super::decoder::SseFrame;

/// One event of a streamed completion
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    MessageStart,
    /// A content block opened; `tool` is set for tool_use blocks
    BlockStart {
        index: usize,
        tool: Option<(String, String)>,
    },
    TextDelta {
        text: String,
    },
    ToolInputDelta {
        index: usize,
        partial_json: String,
    },
    BlockStop {
        index: usize,
    },
    MessageDelta {
        stop_reason: Option<String>,
    },
    MessageStop,
    Error {
        message: String,
    },
    Ignored,
}

impl StreamEvent {
    /// Interpret a frame using the event name in effect for it
    pub fn from_frame(frame: &SseFrame) -> Self {
        let data = &frame.data;
        match frame.event.as_deref() {
            Some("message_start") => StreamEvent::MessageStart,
            Some("content_block_start") => {
                let Some(index) = index_of(data) else {
                    return StreamEvent::Ignored;
                };
                let block = &data["content_block"];
                let tool = if block["type"] == "tool_use" {
                    let id = block["id"].as_str().unwrap_or_default().to_string();
                    let name = block["name"].as_str().unwrap_or_default().to_string();
                    Some((id, name))
                } else {
                    None
                };
                StreamEvent::BlockStart { index, tool }
            }
            Some("content_block_delta") => {
                let delta = &data["delta"];
                match delta["type"].as_str() {
                    Some("text_delta") => StreamEvent::TextDelta {
                        text: delta["text"].as_str().unwrap_or_default().to_string(),
                    },
                    Some("input_json_delta") => match index_of(data) {
                        Some(index) => StreamEvent::ToolInputDelta {
                            index,
                            partial_json: delta["partial_json"].as_str().unwrap_or_default().to_string(),
                        },
                        None => StreamEvent::Ignored,
                    },
                    _ => StreamEvent::Ignored,
                }
            }
            Some("content_block_stop") => match index_of(data) {
                Some(index) => StreamEvent::BlockStop { index },
                None => StreamEvent::Ignored,
            },
            Some("message_delta") => StreamEvent::MessageDelta {
                stop_reason: data["delta"]["stop_reason"].as_str().map(String::from),
            },
            Some("message_stop") => StreamEvent::MessageStop,
            Some("error") => StreamEvent::Error {
                message: error_message(data),
            },
            other => {
                debug!(event = ?other, "StreamEvent::from_frame: ignoring event");
                StreamEvent::Ignored
            }
        }
    }
}

fn index_of(data: &Value) -> Option<usize> {
    data["index"].as_u64().map(|i| i as usize)
}

/// Message of an `error` event
///
/// Our own `api_error` events carry `status` and `message`; provider errors
/// nest the message under `error`.
fn error_message(data: &Value) -> String {
    let message = data["message"]
        .as_str()
        .or_else(|| data["error"]["message"].as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or("Stream error");

    match data["status"].as_u64() {
        Some(status) => format!("API error {}: {}", status, message),
        None => message.to_string(),
    }
}
