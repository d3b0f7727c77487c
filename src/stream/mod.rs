//! Streaming session
//!
//! Turns the raw bytes of one streamed completion into transcript text and
//! applied tool calls.

mod decoder;
mod event;
mod session;
mod throttle;

#[cfg(test)]
pub(crate) mod script;

pub use decoder::{SseDecoder, SseFrame};
pub use event::StreamEvent;
pub use session::{SessionOutcome, StreamError, StreamSession};
pub use throttle::{CommitThrottle, DEFAULT_COMMIT_INTERVAL};
