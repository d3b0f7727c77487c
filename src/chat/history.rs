//! Outbound message construction
//!
//! The Messages API requires every assistant `tool_use` block to be answered
//! by a `tool_result` in the following user message. Historical calls are
//! answered from the transcript; the calls of the round that just finished
//! are answered by the pending results appended at the end.

use std::collections::HashSet;

use tracing::debug;

use super::types::{ChatMessage, ToolCallInfo};
use crate::llm::{ContentBlock, Message, Role};

/// Build the request messages from the transcript and pending tool results
pub fn build_api_messages(history: &[ChatMessage], pending: &[ToolCallInfo]) -> Vec<Message> {
    debug!(history = history.len(), pending = pending.len(), "build_api_messages: called");
    let pending_ids: HashSet<&str> = pending.iter().map(|c| c.id.as_str()).collect();
    let mut messages = Vec::new();

    for msg in history {
        match msg.role {
            Role::User => messages.push(Message::user(msg.content.clone())),
            Role::Assistant => {
                let mut blocks = Vec::new();
                if !msg.content.is_empty() {
                    blocks.push(ContentBlock::text(msg.content.clone()));
                }
                for call in msg.calls() {
                    blocks.push(ContentBlock::tool_use(&call.id, &call.name, call.input.clone()));
                }
                if blocks.is_empty() {
                    continue;
                }
                messages.push(Message::assistant_blocks(blocks));

                let answered: Vec<ContentBlock> = msg
                    .calls()
                    .iter()
                    .filter(|c| !pending_ids.contains(c.id.as_str()))
                    .map(result_block)
                    .collect();
                if !answered.is_empty() {
                    messages.push(Message::user_blocks(answered));
                }
            }
        }
    }

    if !pending.is_empty() {
        messages.push(Message::user_blocks(pending.iter().map(result_block).collect()));
    }

    messages
}

fn result_block(call: &ToolCallInfo) -> ContentBlock {
    ContentBlock::tool_result(&call.id, call.result_text(), false)
}
