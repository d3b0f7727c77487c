//! Built-in trip tools

mod add_stop;
mod recommendations;
mod remove_stop;
mod reorder_stops;
mod set_route;
mod update_stop;
mod update_trip;

pub use add_stop::AddStopTool;
pub use recommendations::{FoodKind, RecommendationTool};
pub use remove_stop::RemoveStopTool;
pub use reorder_stops::ReorderStopsTool;
pub use set_route::SetRouteTool;
pub use update_stop::UpdateStopTool;
pub use update_trip::UpdateTripTool;

use serde_json::{Value, json};

pub(crate) const ACCOMMODATION_TYPES: [&str; 5] = ["hotel", "hostel", "airbnb", "camping", "other"];

/// Schema of one activity; `categories` restricts the category enum
pub(crate) fn activity_schema(categories: Option<&[&str]>) -> Value {
    let category = match categories {
        Some(values) => json!({ "type": "string", "enum": values }),
        None => json!({ "type": "string" }),
    };
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "description": { "type": "string" },
            "duration_hours": { "type": "number" },
            "cost_estimate": { "type": "number" },
            "category": category,
        },
        "required": ["name"]
    })
}

pub(crate) fn accommodation_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "type": { "type": "string", "enum": ACCOMMODATION_TYPES },
            "cost_per_night": { "type": "number" },
            "notes": { "type": "string" }
        },
        "required": ["name", "type"]
    })
}
