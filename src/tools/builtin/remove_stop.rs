//! RemoveStop tool - drop a stop by name

use serde_json::{Value, json};
use tracing::debug;

use crate::tools::coerce;
use crate::tools::{Tool, ToolContext, ToolResult};
use crate::trip::TripAction;

pub struct RemoveStopTool;

impl Tool for RemoveStopTool {
    fn name(&self) -> &'static str {
        "remove_stop"
    }

    fn description(&self) -> &'static str {
        "Remove a stop from the itinerary by name. Use this when the user wants to skip a destination. \
         Do NOT use remove + add to reorder - use reorder_stops instead."
    }

    fn input_schema(&self, _currency: &str) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the stop to remove (case-insensitive match)"
                }
            },
            "required": ["name"]
        })
    }

    fn interpret(&self, input: &Value, ctx: &ToolContext<'_>) -> ToolResult {
        let name = coerce::string(input.get("name")).unwrap_or_default();
        debug!(%name, "remove_stop: called");

        match ctx.find_stop(&name) {
            Some(stop) => ToolResult::success(
                format!("Removed stop: {}", stop.name),
                vec![TripAction::RemoveStop(stop.id.clone())],
            ),
            None => ToolResult::error(ctx.stop_not_found(&name)),
        }
    }
}
