//! LlmClient trait definition

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::{CompletionRequest, LlmError};

/// Raw SSE bytes of one streamed completion, in arrival order
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, LlmError>> + Send>>;

/// Opens streamed completions
///
/// The client only establishes the connection; decoding the event stream
/// belongs to the caller. A failed response after retries is still handed
/// back as a stream carrying a single `error` event.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn open_stream(&self, request: CompletionRequest) -> Result<ByteStream, LlmError>;
}

/// Encode one SSE event the way the completion endpoint frames it
pub fn sse_event(event: &str, data: &serde_json::Value) -> String {
    format!("event: {}\ndata: {}\n\n", event, data)
}

/// Single-event stream reporting a failed request
pub fn api_error_stream(status: u16, message: &str) -> ByteStream {
    let message = if message.is_empty() { "Anthropic API error" } else { message };
    let payload = serde_json::json!({
        "type": "api_error",
        "status": status,
        "message": message,
    });
    let bytes = sse_event("error", &payload).into_bytes();
    Box::pin(futures::stream::iter(vec![Ok(bytes)]))
}
