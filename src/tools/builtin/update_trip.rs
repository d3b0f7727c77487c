//! UpdateTrip tool - trip-level metadata

use serde_json::{Value, json};
use tracing::debug;

use crate::tools::coerce;
use crate::tools::{Tool, ToolContext, ToolResult};
use crate::trip::{MetadataPatch, TripAction};

/// UpdateTrip tool - name, dates, group size, budget, currency and food query
///
/// Fields outside that whitelist (mode, score) cannot be set by the model.
pub struct UpdateTripTool;

impl Tool for UpdateTripTool {
    fn name(&self) -> &'static str {
        "update_trip"
    }

    fn description(&self) -> &'static str {
        "Update trip-level metadata such as the trip name, dates, number of travelers, or total budget. \
         Does not affect individual stops."
    }

    fn input_schema(&self, currency: &str) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Trip name" },
                "start_date": { "type": "string", "description": "Start date (YYYY-MM-DD)" },
                "end_date": { "type": "string", "description": "End date (YYYY-MM-DD)" },
                "travelers": { "type": "number", "description": "Number of travelers" },
                "total_budget": { "type": "number", "description": format!("Total budget in {}", currency) },
                "currency": { "type": "string", "description": "Currency code (default: EUR)" },
                "food_query": {
                    "type": "string",
                    "description": "Google Places search query for food preferences (e.g. \"italian restaurant\", \
                                    \"vegan food\", \"seafood restaurant\"). Set this after learning the \
                                    travelers' food preferences."
                }
            }
        })
    }

    fn interpret(&self, input: &Value, _ctx: &ToolContext<'_>) -> ToolResult {
        let patch = MetadataPatch {
            name: coerce::string(input.get("name")),
            start_date: coerce::string(input.get("start_date")),
            end_date: coerce::string(input.get("end_date")),
            travelers: coerce::count(input.get("travelers")),
            total_budget: coerce::number(input.get("total_budget")),
            currency: coerce::string(input.get("currency")),
            food_query: coerce::string(input.get("food_query")),
            ..Default::default()
        };
        let fields = patch.field_names();
        debug!(?fields, "update_trip: called");

        ToolResult::success(
            format!("Updated trip: {}", fields.join(", ")),
            vec![TripAction::UpdateTripMetadata(patch)],
        )
    }
}
