//! Scripted completion transcripts for tests

use serde_json::json;

use crate::llm::sse_event;

/// Builds an SSE transcript the way the completion endpoint streams it
pub struct Script {
    out: String,
    index: usize,
}

impl Script {
    pub fn new() -> Self {
        let out = sse_event(
            "message_start",
            &json!({"type": "message_start", "message": {"id": "msg_test", "role": "assistant", "content": []}}),
        );
        Self { out, index: 0 }
    }

    /// A text block streamed as one delta
    pub fn text(mut self, text: &str) -> Self {
        let index = self.next_index();
        self.out.push_str(&sse_event(
            "content_block_start",
            &json!({"type": "content_block_start", "index": index, "content_block": {"type": "text", "text": ""}}),
        ));
        self.out.push_str(&sse_event(
            "content_block_delta",
            &json!({"type": "content_block_delta", "index": index, "delta": {"type": "text_delta", "text": text}}),
        ));
        self.stop_block(index);
        self
    }

    /// A tool_use block whose input arrives in two partial deltas
    pub fn tool(mut self, id: &str, name: &str, input_json: &str) -> Self {
        let index = self.next_index();
        self.out.push_str(&sse_event(
            "content_block_start",
            &json!({"type": "content_block_start", "index": index,
                    "content_block": {"type": "tool_use", "id": id, "name": name, "input": {}}}),
        ));
        let mid = input_json.char_indices().nth(input_json.chars().count() / 2).map_or(0, |(i, _)| i);
        for part in [&input_json[..mid], &input_json[mid..]] {
            self.out.push_str(&sse_event(
                "content_block_delta",
                &json!({"type": "content_block_delta", "index": index,
                        "delta": {"type": "input_json_delta", "partial_json": part}}),
            ));
        }
        self.stop_block(index);
        self
    }

    /// Finish with a stop reason
    pub fn end(mut self, stop_reason: &str) -> String {
        self.out.push_str(&sse_event(
            "message_delta",
            &json!({"type": "message_delta", "delta": {"stop_reason": stop_reason}, "usage": {"output_tokens": 1}}),
        ));
        self.out.push_str(&sse_event("message_stop", &json!({"type": "message_stop"})));
        self.out
    }

    /// Transcript so far, without a message end
    pub fn into_string(self) -> String {
        self.out
    }

    fn next_index(&mut self) -> usize {
        let index = self.index;
        self.index += 1;
        index
    }

    fn stop_block(&mut self, index: usize) {
        self.out.push_str(&sse_event(
            "content_block_stop",
            &json!({"type": "content_block_stop", "index": index}),
        ));
    }
}
