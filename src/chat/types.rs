//! Chat transcript types and orchestrator events

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::llm::{Role, StopReason};

/// Shared, in-memory chat transcript
pub type Transcript = Arc<Mutex<Vec<ChatMessage>>>;

/// Create an empty transcript
pub fn new_transcript() -> Transcript {
    Arc::new(Mutex::new(Vec::new()))
}

/// Generate a message id like `msg_1718000000000_k3x9qa`
pub fn generate_message_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("msg_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// One message in the chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    /// Grows while the assistant message is streaming
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallInfo>>,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            role: Role::User,
            content: content.into(),
            tool_calls: None,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Empty assistant message that a stream fills in
    pub fn assistant_placeholder() -> Self {
        Self {
            id: generate_message_id(),
            role: Role::Assistant,
            content: String::new(),
            tool_calls: None,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Tool calls made in this message (empty when none)
    pub fn calls(&self) -> &[ToolCallInfo] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

/// A tool call as recorded in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallInfo {
    pub id: String,
    pub name: String,
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallInfo {
    /// Result text sent back to the model; empty results become "Done"
    pub fn result_text(&self) -> &str {
        match self.result.as_deref() {
            Some(result) if !result.is_empty() => result,
            _ => "Done",
        }
    }
}

/// Orchestrator status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    #[default]
    Idle,
    Streaming,
    ProcessingTools,
    Error,
}

impl ChatStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, ChatStatus::Streaming | ChatStatus::ProcessingTools)
    }
}

impl std::fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChatStatus::Idle => "idle",
            ChatStatus::Streaming => "streaming",
            ChatStatus::ProcessingTools => "processing_tools",
            ChatStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Empty input, nothing sent
    Ignored,
    /// The model finished, or the round limit was reached
    Completed {
        rounds: u32,
        stop_reason: Option<StopReason>,
    },
    /// Stopped by the user; text streamed so far is kept
    Cancelled,
}

/// Progress notifications for front ends
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    StatusChanged(ChatStatus),
    MessageAppended { id: String, role: Role },
    /// Throttled snapshot of the streaming assistant text
    TextCommitted { message_id: String, text: String },
    ToolApplied { message_id: String, call: ToolCallInfo },
    TurnFinished(TurnOutcome),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_id_shape() {
        let id = generate_message_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "msg");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 6);
        assert_ne!(generate_message_id(), generate_message_id());
    }

    #[test]
    fn test_result_text_defaults_to_done() {
        let mut call = ToolCallInfo {
            id: "t1".to_string(),
            name: "add_stop".to_string(),
            input: json!({}),
            result: None,
            is_error: false,
        };
        assert_eq!(call.result_text(), "Done");
        call.result = Some(String::new());
        assert_eq!(call.result_text(), "Done");
        call.result = Some("Added stop: Rome at the end".to_string());
        assert_eq!(call.result_text(), "Added stop: Rome at the end");
    }

    #[test]
    fn test_chat_message_serializes_without_empty_calls() {
        let msg = ChatMessage::user("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("tool_calls").is_none());
        assert!(msg.calls().is_empty());
    }

    #[test]
    fn test_status_busy() {
        assert!(ChatStatus::Streaming.is_busy());
        assert!(ChatStatus::ProcessingTools.is_busy());
        assert!(!ChatStatus::Idle.is_busy());
        assert_eq!(ChatStatus::ProcessingTools.to_string(), "processing_tools");
    }
}
