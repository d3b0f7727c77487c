//! Tool trait definition

use serde_json::Value;
use tracing::debug;

use super::context::ToolContext;
use crate::trip::{ActivityCategory, TripAction};

/// A tool the model can call to change the trip
///
/// Interpretation is pure: it reads the context's document snapshot and
/// returns actions for the caller to dispatch.
pub trait Tool: Send + Sync {
    /// Tool name (matches LLM tool_use name)
    fn name(&self) -> &'static str;

    /// Description shown to the model
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters; cost fields are quoted in `currency`
    fn input_schema(&self, currency: &str) -> Value;

    /// Turn a call's input into actions and a result text for the model
    fn interpret(&self, input: &Value, ctx: &ToolContext<'_>) -> ToolResult;
}

/// A restaurant added by a recommendation tool
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    /// Stop name exactly as the model wrote it
    pub stop_name: String,
    pub restaurant_name: String,
    pub specialty: String,
    pub description: Option<String>,
    pub category: ActivityCategory,
}

/// Result of interpreting one tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub actions: Vec<TripAction>,
    pub content: String,
    pub is_error: bool,
    /// Venues added by recommendation tools, for mode hooks
    pub venues: Vec<Venue>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>, actions: Vec<TripAction>) -> Self {
        debug!(actions = actions.len(), "ToolResult::success: called");
        Self {
            actions,
            content: content.into(),
            is_error: false,
            venues: Vec::new(),
        }
    }

    /// Create an error result (never carries actions)
    pub fn error(content: impl Into<String>) -> Self {
        debug!("ToolResult::error: called");
        Self {
            actions: Vec::new(),
            content: content.into(),
            is_error: true,
            venues: Vec::new(),
        }
    }

    pub fn with_venues(mut self, venues: Vec<Venue>) -> Self {
        self.venues = venues;
        self
    }
}
