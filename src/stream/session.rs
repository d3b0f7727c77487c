//! StreamSession - consumes one streamed completion
//!
//! Text deltas are buffered and committed to the transcript at most once per
//! frame period. Tool calls are accumulated per content block and, as soon as
//! a block closes, interpreted against a fresh store snapshot and dispatched,
//! so later calls in the same response see earlier calls' effects.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::decoder::{SseDecoder, SseFrame};
use super::event::StreamEvent;
use super::throttle::{self, CommitThrottle};
use crate::chat::{ChatEvent, ToolCallInfo, Transcript};
use crate::llm::{ByteStream, LlmError, StopReason, ToolCall};
use crate::tools::ToolInterpreter;
use crate::trip::{StoreError, TripStore};

/// Errors that end a stream early
#[derive(Debug, Error)]
pub enum StreamError {
    /// The endpoint reported an error inside the stream
    #[error("{0}")]
    Remote(String),

    #[error("Stream transport failed: {0}")]
    Transport(#[from] LlmError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one stream produced
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub stop_reason: Option<StopReason>,
    pub tool_calls: Vec<ToolCallInfo>,
    pub text: String,
    pub cancelled: bool,
}

impl SessionOutcome {
    /// Whether the model is waiting for tool results
    pub fn wants_continuation(&self) -> bool {
        !self.cancelled && self.stop_reason == Some(StopReason::ToolUse) && !self.tool_calls.is_empty()
    }
}

/// A tool_use block still receiving input
#[derive(Debug)]
struct ToolAccumulator {
    id: String,
    name: String,
    input_json: String,
}

pub struct StreamSession {
    message_id: String,
    store: TripStore,
    interpreter: Arc<ToolInterpreter>,
    transcript: Transcript,
    events: broadcast::Sender<ChatEvent>,
    decoder: SseDecoder,
    throttle: CommitThrottle,
    accumulators: HashMap<usize, ToolAccumulator>,
    text: String,
    tool_calls: Vec<ToolCallInfo>,
    stop_reason: Option<StopReason>,
}

impl StreamSession {
    /// Session writing into the transcript message `message_id`
    pub fn new(
        message_id: impl Into<String>,
        store: TripStore,
        interpreter: Arc<ToolInterpreter>,
        transcript: Transcript,
        events: broadcast::Sender<ChatEvent>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            store,
            interpreter,
            transcript,
            events,
            decoder: SseDecoder::new(),
            throttle: CommitThrottle::default(),
            accumulators: HashMap::new(),
            text: String::new(),
            tool_calls: Vec::new(),
            stop_reason: None,
        }
    }

    pub fn with_commit_interval(mut self, interval: Duration) -> Self {
        self.throttle = CommitThrottle::new(interval);
        self
    }

    /// Consume the stream until it ends, errors or `cancel` fires
    ///
    /// Text and tool calls gathered before an error or cancellation are still
    /// written to the transcript message.
    pub async fn run(mut self, bytes: ByteStream, cancel: CancellationToken) -> Result<SessionOutcome, StreamError> {
        debug!(message_id = %self.message_id, "StreamSession::run: called");
        let result = self.pump(bytes, &cancel).await;
        self.finalize().await;

        let cancelled = result?;
        info!(
            message_id = %self.message_id,
            text_len = self.text.len(),
            tool_calls = self.tool_calls.len(),
            stop_reason = ?self.stop_reason,
            cancelled,
            "StreamSession::run: done"
        );
        Ok(SessionOutcome {
            stop_reason: self.stop_reason,
            tool_calls: self.tool_calls,
            text: self.text,
            cancelled,
        })
    }

    /// Returns true when cancelled
    async fn pump(&mut self, mut bytes: ByteStream, cancel: &CancellationToken) -> Result<bool, StreamError> {
        loop {
            let deadline = self.throttle.deadline();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("pump: cancelled");
                    return Ok(true);
                }
                _ = throttle::wait_until(deadline) => {
                    self.commit_text().await;
                }
                chunk = bytes.next() => match chunk {
                    Some(Ok(chunk)) => {
                        for frame in self.decoder.feed(&chunk) {
                            self.handle_frame(frame).await?;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "pump: transport error");
                        return Err(StreamError::Transport(e));
                    }
                    None => break,
                }
            }
        }

        for frame in self.decoder.finish() {
            self.handle_frame(frame).await?;
        }
        if !self.accumulators.is_empty() {
            warn!(open = self.accumulators.len(), "pump: stream ended with unfinished tool calls");
        }
        Ok(false)
    }

    async fn handle_frame(&mut self, frame: SseFrame) -> Result<(), StreamError> {
        match StreamEvent::from_frame(&frame) {
            StreamEvent::BlockStart {
                index,
                tool: Some((id, name)),
            } => {
                debug!(%index, %id, %name, "handle_frame: tool block started");
                self.accumulators.insert(
                    index,
                    ToolAccumulator {
                        id,
                        name,
                        input_json: String::new(),
                    },
                );
            }
            StreamEvent::TextDelta { text } => {
                self.text.push_str(&text);
                self.throttle.request();
            }
            StreamEvent::ToolInputDelta { index, partial_json } => {
                if let Some(acc) = self.accumulators.get_mut(&index) {
                    acc.input_json.push_str(&partial_json);
                }
            }
            StreamEvent::BlockStop { index } => {
                if let Some(acc) = self.accumulators.remove(&index) {
                    self.apply_tool_call(acc).await?;
                }
            }
            StreamEvent::MessageDelta {
                stop_reason: Some(reason),
            } => {
                self.stop_reason = Some(StopReason::from_anthropic(&reason));
            }
            StreamEvent::Error { message } => {
                warn!(%message, "handle_frame: error event");
                return Err(StreamError::Remote(message));
            }
            StreamEvent::MessageStart
            | StreamEvent::BlockStart { tool: None, .. }
            | StreamEvent::MessageDelta { stop_reason: None }
            | StreamEvent::MessageStop
            | StreamEvent::Ignored => {}
        }
        Ok(())
    }

    async fn apply_tool_call(&mut self, acc: ToolAccumulator) -> Result<(), StreamError> {
        let call = ToolCall {
            id: acc.id,
            name: acc.name,
            input: parse_tool_input(&acc.input_json),
        };
        debug!(id = %call.id, name = %call.name, "apply_tool_call: called");

        let snapshot = self.store.snapshot();
        let ids = self.store.ids();
        let result = self.interpreter.interpret(&call, &snapshot.document, ids.as_ref());
        info!(
            name = %call.name,
            actions = result.actions.len(),
            is_error = result.is_error,
            "apply_tool_call: interpreted"
        );
        self.store.dispatch_all(result.actions).await?;

        let info = ToolCallInfo {
            id: call.id,
            name: call.name,
            input: call.input,
            result: Some(result.content),
            is_error: result.is_error,
        };
        self.tool_calls.push(info.clone());
        let _ = self.events.send(ChatEvent::ToolApplied {
            message_id: self.message_id.clone(),
            call: info,
        });
        Ok(())
    }

    async fn commit_text(&mut self) {
        self.throttle.take();
        {
            let mut messages = self.transcript.lock().await;
            if let Some(message) = messages.iter_mut().find(|m| m.id == self.message_id) {
                message.content.clone_from(&self.text);
            }
        }
        let _ = self.events.send(ChatEvent::TextCommitted {
            message_id: self.message_id.clone(),
            text: self.text.clone(),
        });
    }

    /// Final commit of text and tool calls
    async fn finalize(&mut self) {
        if self.throttle.take() {
            let _ = self.events.send(ChatEvent::TextCommitted {
                message_id: self.message_id.clone(),
                text: self.text.clone(),
            });
        }
        let mut messages = self.transcript.lock().await;
        if let Some(message) = messages.iter_mut().find(|m| m.id == self.message_id) {
            message.content.clone_from(&self.text);
            message.tool_calls = (!self.tool_calls.is_empty()).then(|| self.tool_calls.clone());
        }
    }
}

/// Parse accumulated tool input; empty or invalid JSON becomes `{}`
fn parse_tool_input(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            warn!(kind = ?other, "parse_tool_input: input is not an object");
            Value::Object(Default::default())
        }
        Err(e) => {
            warn!(error = %e, %raw, "parse_tool_input: malformed tool input");
            Value::Object(Default::default())
        }
    }
}
