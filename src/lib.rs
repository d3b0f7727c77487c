//! roadtrip - conversational road trip planner
//!
//! A chat loop where an LLM plans a European road trip by streaming tool
//! calls. Each completed call is interpreted into trip actions and applied to
//! a live itinerary while the reply is still streaming.
//!
//! # Modules
//!
//! - [`trip`] - Trip document, actions, reducer, store actor and persistence
//! - [`tools`] - Tool-call interpretation into trip actions
//! - [`llm`] - Completion endpoint client
//! - [`stream`] - SSE decoding and the per-response streaming session
//! - [`chat`] - Multi-round turns, transcript and rate limiting
//! - [`route`] - Route segment lookup, cache and background fetcher
//! - [`places`] - Nearby restaurant search
//! - [`prompt`] - System prompt rendering
//! - [`config`] - Configuration types and loading
//! - [`cli`] / [`repl`] - Command-line interface and interactive session

pub mod chat;
pub mod cli;
pub mod config;
pub mod llm;
pub mod places;
pub mod prompt;
pub mod repl;
pub mod route;
pub mod stream;
pub mod tools;
pub mod trip;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use chat::{ChatError, ChatEvent, ChatMessage, ChatOptions, ChatOrchestrator, ChatStatus, RateLimiter, TurnOutcome};
pub use config::{Config, LlmConfig};
pub use llm::{AnthropicClient, ByteStream, CompletionRequest, LlmClient, LlmError};
pub use prompt::{PromptOptions, SystemPrompt};
pub use route::{MapboxDirections, PathLookup, RouteError, RouteFetcher};
pub use stream::{SessionOutcome, StreamError, StreamSession};
pub use tools::{InterpreterOptions, ToolInterpreter, ToolResult};
pub use trip::{TripAction, TripDocument, TripPersistence, TripSnapshot, TripStore};
