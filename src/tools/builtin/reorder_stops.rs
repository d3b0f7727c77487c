//! ReorderStops tool - change visiting order by name

use serde_json::{Value, json};
use tracing::debug;

use crate::tools::{Tool, ToolContext, ToolResult};
use crate::trip::TripAction;

pub struct ReorderStopsTool;

impl Tool for ReorderStopsTool {
    fn name(&self) -> &'static str {
        "reorder_stops"
    }

    fn description(&self) -> &'static str {
        "Change the order of stops in the itinerary. Provide the complete list of stop names in the \
         desired new order. All existing stops must be included."
    }

    fn input_schema(&self, _currency: &str) -> Value {
        json!({
            "type": "object",
            "properties": {
                "stop_names": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "All stop names in the desired order"
                }
            },
            "required": ["stop_names"]
        })
    }

    fn interpret(&self, input: &Value, ctx: &ToolContext<'_>) -> ToolResult {
        let Some(raw) = input.get("stop_names").and_then(Value::as_array) else {
            return ToolResult::error("Error: stop_names array is required.");
        };
        let names: Vec<String> = raw
            .iter()
            .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
            .collect();
        debug!(?names, "reorder_stops: called");

        let mut ordered_ids = Vec::with_capacity(names.len());
        for name in &names {
            match ctx.find_stop(name) {
                Some(stop) => ordered_ids.push(stop.id.clone()),
                None => return ToolResult::error(ctx.stop_not_found(name)),
            }
        }

        ToolResult::success(
            format!("Reordered stops: {}", names.join(" → ")),
            vec![TripAction::ReorderStops(ordered_ids)],
        )
    }
}
