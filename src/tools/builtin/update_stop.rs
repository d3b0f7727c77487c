//! UpdateStop tool - patch a stop in place

use serde_json::{Value, json};
use tracing::debug;

use super::{accommodation_schema, activity_schema};
use crate::tools::coerce;
use crate::tools::{Tool, ToolContext, ToolResult};
use crate::trip::{StopPatch, TripAction};

pub struct UpdateStopTool;

impl Tool for UpdateStopTool {
    fn name(&self) -> &'static str {
        "update_stop"
    }

    fn description(&self) -> &'static str {
        "Update details of an existing stop (nights, activities, accommodation, budget). Use this to \
         modify a stop without changing its position in the route."
    }

    fn input_schema(&self, _currency: &str) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the stop to update (case-insensitive match)"
                },
                "nights": { "type": "number" },
                "activities": { "type": "array", "items": activity_schema(None) },
                "accommodation": accommodation_schema(),
                "daily_budget": { "type": "number" },
                "notes": { "type": "string" }
            },
            "required": ["name"]
        })
    }

    fn interpret(&self, input: &Value, ctx: &ToolContext<'_>) -> ToolResult {
        let name = coerce::string(input.get("name")).unwrap_or_default();
        let Some(stop) = ctx.find_stop(&name) else {
            return ToolResult::error(ctx.stop_not_found(&name));
        };

        // Only fields present with a usable type make it into the patch
        let patch = StopPatch {
            nights: coerce::count(input.get("nights")),
            activities: coerce::array(input.get("activities")).map(|_| coerce::activities(input.get("activities"))),
            accommodation: coerce::accommodation(input.get("accommodation")),
            daily_budget: coerce::number(input.get("daily_budget")),
            notes: coerce::string(input.get("notes")),
            ..Default::default()
        };
        debug!(stop_id = %stop.id, ?patch, "update_stop: patch built");

        ToolResult::success(
            format!("Updated stop: {}", stop.name),
            vec![TripAction::UpdateStop {
                stop_id: stop.id.clone(),
                patch,
            }],
        )
    }
}
