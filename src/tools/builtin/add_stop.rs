//! AddStop tool - insert one stop

use serde_json::{Value, json};
use tracing::debug;

use super::{accommodation_schema, activity_schema};
use crate::tools::coerce;
use crate::tools::{Tool, ToolContext, ToolResult};
use crate::trip::TripAction;

/// AddStop tool - add a single destination to an existing trip
pub struct AddStopTool;

impl Tool for AddStopTool {
    fn name(&self) -> &'static str {
        "add_stop"
    }

    fn description(&self) -> &'static str {
        "Add a single stop to the existing itinerary at a specific position. Use this when the user wants \
         to add one new destination to an already-planned trip. Do NOT use this for reordering - use \
         reorder_stops instead."
    }

    fn input_schema(&self, _currency: &str) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "City or location name" },
                "lat": { "type": "number", "description": "Latitude" },
                "lng": { "type": "number", "description": "Longitude" },
                "country": { "type": "string", "description": "Country name" },
                "nights": { "type": "number", "description": "Number of nights to stay" },
                "position": {
                    "type": "number",
                    "description": "Zero-based index where to insert the stop. Omit to add at the end."
                },
                "activities": { "type": "array", "items": activity_schema(None) },
                "accommodation": accommodation_schema(),
                "daily_budget": { "type": "number" },
                "notes": { "type": "string" }
            },
            "required": ["name", "lat", "lng", "nights"]
        })
    }

    fn interpret(&self, input: &Value, ctx: &ToolContext<'_>) -> ToolResult {
        let stop = coerce::stop(input, ctx.ids.next_id());
        let requested = coerce::number(input.get("position"));
        debug!(name = %stop.name, ?requested, "add_stop: called");

        // Negative or fractional positions fall through to the reducer's append rule
        let position = requested.filter(|p| *p >= 0.0 && p.fract() == 0.0).map(|p| p as usize);
        let content = match requested {
            Some(p) => format!("Added stop: {} at position {}", stop.name, coerce::format_number(p)),
            None => format!("Added stop: {} at the end", stop.name),
        };

        ToolResult::success(content, vec![TripAction::AddStop { stop, position }])
    }
}
