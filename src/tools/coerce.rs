//! Lenient extraction of tool arguments
//!
//! Model output is loosely typed: a field may be missing, carry the wrong
//! JSON type, or hold a number as a string. Every helper here maps that onto
//! a value or a default instead of failing the whole call.

use serde_json::Value;

use crate::trip::{Accommodation, AccommodationType, Activity, ActivityCategory, Coordinates, Stop};

/// Number from a JSON number or numeric string
pub fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Non-empty string (numbers are rendered as text)
pub fn string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Positive whole count; zero and fractions round to a usable value
pub fn count(value: Option<&Value>) -> Option<u32> {
    number(value).filter(|n| *n >= 1.0).map(|n| n.round() as u32)
}

/// Nights at a stop, falling back to one
pub fn nights(value: Option<&Value>) -> u32 {
    count(value).unwrap_or(1)
}

/// Latitude or longitude, falling back to zero
pub fn coordinate(value: Option<&Value>) -> f64 {
    number(value).unwrap_or(0.0)
}

pub fn array(value: Option<&Value>) -> Option<&Vec<Value>> {
    value.and_then(Value::as_array)
}

/// Render a number the way the model wrote it (`2`, not `2.0`)
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub fn activity(value: &Value) -> Option<Activity> {
    let obj = value.as_object()?;
    Some(Activity {
        name: string(obj.get("name")).unwrap_or_default(),
        description: string(obj.get("description")),
        duration_hours: number(obj.get("duration_hours")),
        cost_estimate: number(obj.get("cost_estimate")),
        category: obj
            .get("category")
            .and_then(Value::as_str)
            .and_then(ActivityCategory::parse),
        specialty: string(obj.get("specialty")),
        address: string(obj.get("address")),
        time: string(obj.get("time")),
    })
}

/// Activity list; non-object entries are dropped
pub fn activities(value: Option<&Value>) -> Vec<Activity> {
    array(value)
        .map(|items| items.iter().filter_map(activity).collect())
        .unwrap_or_default()
}

/// Accommodation, or None when it has no name
pub fn accommodation(value: Option<&Value>) -> Option<Accommodation> {
    let obj = value?.as_object()?;
    let name = string(obj.get("name"))?;
    Some(Accommodation {
        name,
        kind: obj
            .get("type")
            .and_then(Value::as_str)
            .map(AccommodationType::parse)
            .unwrap_or_default(),
        cost_per_night: number(obj.get("cost_per_night")),
        notes: string(obj.get("notes")),
    })
}

/// Full stop description as used by `set_route` entries and `add_stop`
pub fn stop(value: &Value, id: String) -> Stop {
    Stop {
        id,
        name: string(value.get("name")).unwrap_or_default(),
        coordinates: Coordinates::new(coordinate(value.get("lat")), coordinate(value.get("lng"))),
        country: string(value.get("country")),
        nights: nights(value.get("nights")),
        activities: activities(value.get("activities")),
        accommodation: accommodation(value.get("accommodation")),
        daily_budget: number(value.get("daily_budget")),
        notes: string(value.get("notes")),
    }
}
