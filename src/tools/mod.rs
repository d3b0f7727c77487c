//! Tool-call interpretation
//!
//! Each completed tool call from the model is interpreted against the current
//! trip snapshot into a list of trip actions plus a result text that is fed
//! back to the model. Interpretation never touches the store directly.

pub mod coerce;
mod context;
mod hooks;
mod interpreter;
mod traits;

pub mod builtin;

pub use context::{InterpreterOptions, ToolContext};
pub use hooks::{BurgerChallengeHook, ModeHook};
pub use interpreter::ToolInterpreter;
pub use traits::{Tool, ToolResult, Venue};
