//! Chat turns
//!
//! The orchestrator owns the in-memory transcript and runs each user turn
//! through as many streamed rounds as the model's tool use requires.

mod history;
mod orchestrator;
mod ratelimit;
mod types;

pub use history::build_api_messages;
pub use orchestrator::{ChatError, ChatOptions, ChatOrchestrator, MAX_API_MESSAGES, MAX_CONTINUATION_ROUNDS};
pub use ratelimit::{Clock, RateLimiter, SystemClock};
pub use types::{
    ChatEvent, ChatMessage, ChatStatus, ToolCallInfo, Transcript, TurnOutcome, generate_message_id, new_transcript,
};
