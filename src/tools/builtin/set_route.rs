//! SetRoute tool - replace the whole itinerary

use serde_json::{Value, json};
use tracing::{debug, info};

use super::{accommodation_schema, activity_schema};
use crate::tools::coerce;
use crate::tools::{Tool, ToolContext, ToolResult};
use crate::trip::{MetadataPatch, TripAction};

const CATEGORIES: [&str; 8] = [
    "sightseeing",
    "food",
    "adventure",
    "culture",
    "relaxation",
    "nightlife",
    "shopping",
    "burger",
];

/// SetRoute tool - set every stop at once, optionally with trip metadata
pub struct SetRouteTool;

impl Tool for SetRouteTool {
    fn name(&self) -> &'static str {
        "set_route"
    }

    fn description(&self) -> &'static str {
        "Set the entire trip itinerary at once. Use this when creating a new trip or completely replacing \
         the current route. Provides all stops with coordinates, activities, accommodations, and budget \
         estimates. Always use this for initial trip creation rather than calling add_stop multiple times."
    }

    fn input_schema(&self, currency: &str) -> Value {
        json!({
            "type": "object",
            "properties": {
                "stops": {
                    "type": "array",
                    "description": "Ordered list of stops for the trip",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "description": "City or location name" },
                            "lat": { "type": "number", "description": "Latitude" },
                            "lng": { "type": "number", "description": "Longitude" },
                            "country": { "type": "string", "description": "Country name" },
                            "nights": { "type": "number", "description": "Number of nights to stay" },
                            "activities": {
                                "type": "array",
                                "items": activity_schema(Some(&CATEGORIES))
                            },
                            "accommodation": accommodation_schema(),
                            "daily_budget": {
                                "type": "number",
                                "description": format!("Estimated daily budget in {}", currency)
                            },
                            "notes": { "type": "string" }
                        },
                        "required": ["name", "lat", "lng", "nights"]
                    }
                },
                "trip_name": { "type": "string", "description": "Name for the trip" },
                "start_date": { "type": "string", "description": "Trip start date (YYYY-MM-DD)" },
                "travelers": { "type": "number", "description": "Number of travelers" },
                "total_budget": {
                    "type": "number",
                    "description": format!("Total trip budget in {}", currency)
                }
            },
            "required": ["stops"]
        })
    }

    fn interpret(&self, input: &Value, ctx: &ToolContext<'_>) -> ToolResult {
        let raw_stops = match coerce::array(input.get("stops")) {
            Some(stops) if !stops.is_empty() => stops,
            _ => return ToolResult::error("Error: stops array is required and must not be empty."),
        };
        debug!(count = raw_stops.len(), "set_route: interpreting stops");

        let stops: Vec<_> = raw_stops
            .iter()
            .map(|raw| coerce::stop(raw, ctx.ids.next_id()))
            .collect();
        let summary = stops.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(" → ");
        let content = format!("Route set with {} stops: {}", stops.len(), summary);

        let mut actions = vec![TripAction::SetRoute(stops)];

        let patch = MetadataPatch {
            name: coerce::string(input.get("trip_name")),
            start_date: coerce::string(input.get("start_date")),
            travelers: coerce::count(input.get("travelers")),
            total_budget: coerce::number(input.get("total_budget")).filter(|b| *b != 0.0),
            ..Default::default()
        };
        if !patch.is_empty() {
            debug!(fields = ?patch.field_names(), "set_route: including trip metadata");
            actions.push(TripAction::UpdateTripMetadata(patch));
        }

        info!(%content, "set_route: interpreted");
        ToolResult::success(content, actions)
    }
}
