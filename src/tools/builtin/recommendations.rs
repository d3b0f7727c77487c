//! Food recommendation tools
//!
//! `add_burger_recommendations` and `add_fondue_recommendations` share one
//! implementation parameterized by [`FoodKind`]. Venues become activities
//! appended to each named stop; names that do not resolve are skipped with a
//! warning line unless strict mode is on.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::tools::coerce;
use crate::tools::{Tool, ToolContext, ToolResult, Venue};
use crate::trip::{Activity, ActivityCategory, StopPatch, TripAction};

/// Which kind of food venue a recommendation tool adds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodKind {
    Burger,
    Fondue,
}

impl FoodKind {
    fn tool_name(&self) -> &'static str {
        match self {
            FoodKind::Burger => "add_burger_recommendations",
            FoodKind::Fondue => "add_fondue_recommendations",
        }
    }

    /// Key of the venue list inside each recommendation
    fn list_key(&self) -> &'static str {
        match self {
            FoodKind::Burger => "burgers",
            FoodKind::Fondue => "fondues",
        }
    }

    fn category(&self) -> ActivityCategory {
        match self {
            FoodKind::Burger => ActivityCategory::Burger,
            FoodKind::Fondue => ActivityCategory::Fondue,
        }
    }

    /// Typical meal length in hours
    fn duration_hours(&self) -> f64 {
        match self {
            FoodKind::Burger => 1.0,
            FoodKind::Fondue => 2.0,
        }
    }

    fn emoji(&self) -> &'static str {
        match self {
            FoodKind::Burger => "🍔",
            FoodKind::Fondue => "🧀",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            FoodKind::Burger => "burger",
            FoodKind::Fondue => "fondue",
        }
    }
}

/// Recommendation tool for one [`FoodKind`]
pub struct RecommendationTool {
    kind: FoodKind,
}

impl RecommendationTool {
    pub fn new(kind: FoodKind) -> Self {
        Self { kind }
    }

    pub fn burger() -> Self {
        Self::new(FoodKind::Burger)
    }

    pub fn fondue() -> Self {
        Self::new(FoodKind::Fondue)
    }

    fn venue_schema(&self, currency: &str) -> Value {
        let (specialty, time) = match self.kind {
            FoodKind::Burger => (
                "Signature burger or dish (e.g., \"Classic smash burger with truffle fries\")",
                "Recommended time (e.g., \"Lunch\", \"Dinner\")",
            ),
            FoodKind::Fondue => (
                "Type of fondue (e.g., \"Traditional Gruyère & Vacherin blend\")",
                "Recommended time (usually \"Dinner\")",
            ),
        };
        json!({
            "type": "object",
            "properties": {
                "restaurant_name": { "type": "string", "description": "Restaurant name" },
                "specialty": { "type": "string", "description": specialty },
                "address": { "type": "string", "description": "Street address" },
                "cost_estimate": { "type": "number", "description": format!("Cost per person in {}", currency) },
                "time_suggestion": { "type": "string", "description": time },
                "description": { "type": "string", "description": "What makes this place special" }
            },
            "required": ["restaurant_name", "specialty", "cost_estimate"]
        })
    }

    /// Turn one venue entry into an activity priced for the whole group
    fn activity(&self, raw: &Value, travelers: u32) -> Activity {
        Activity {
            name: coerce::string(raw.get("restaurant_name")).unwrap_or_default(),
            description: coerce::string(raw.get("description")),
            duration_hours: Some(self.kind.duration_hours()),
            cost_estimate: coerce::number(raw.get("cost_estimate")).map(|per_person| per_person * travelers as f64),
            category: Some(self.kind.category()),
            specialty: coerce::string(raw.get("specialty")),
            address: coerce::string(raw.get("address")),
            time: coerce::string(raw.get("time_suggestion")),
        }
    }
}

impl Tool for RecommendationTool {
    fn name(&self) -> &'static str {
        self.kind.tool_name()
    }

    fn description(&self) -> &'static str {
        match self.kind {
            FoodKind::Burger => {
                "Add burger restaurant recommendations as activities to one or more stops. Use this after \
                 creating a route when the user is a burger enthusiast. Include specific restaurants with \
                 names, specialties, addresses, and costs."
            }
            FoodKind::Fondue => {
                "Add cheese fondue restaurant recommendations as activities to Swiss stops. Use when the \
                 route passes through Switzerland and the user loves fondue. Include specific restaurants \
                 with traditional Swiss fondue experiences."
            }
        }
    }

    fn input_schema(&self, currency: &str) -> Value {
        let stop_description = match self.kind {
            FoodKind::Burger => "Name of the city/stop",
            FoodKind::Fondue => "Name of the city/stop (should be in Switzerland)",
        };
        let mut item_properties = serde_json::Map::new();
        item_properties.insert(
            "stop_name".to_string(),
            json!({ "type": "string", "description": stop_description }),
        );
        item_properties.insert(
            self.kind.list_key().to_string(),
            json!({
                "type": "array",
                "description": format!("List of {} restaurants for this stop", self.kind.noun()),
                "items": self.venue_schema(currency)
            }),
        );

        json!({
            "type": "object",
            "properties": {
                "recommendations": {
                    "type": "array",
                    "description": format!("{} recommendations grouped by stop", capitalize(self.kind.noun())),
                    "items": {
                        "type": "object",
                        "properties": item_properties,
                        "required": ["stop_name", self.kind.list_key()]
                    }
                }
            },
            "required": ["recommendations"]
        })
    }

    fn interpret(&self, input: &Value, ctx: &ToolContext<'_>) -> ToolResult {
        let recommendations = match coerce::array(input.get("recommendations")) {
            Some(recs) if !recs.is_empty() => recs,
            _ => return ToolResult::error("Error: recommendations array is required and must not be empty."),
        };
        debug!(tool = self.name(), count = recommendations.len(), "recommendations: called");

        let travelers = ctx.travelers();
        // Stop id -> existing plus new activities, in first-mention order
        let mut grouped: Vec<(String, Vec<Activity>)> = Vec::new();
        let mut lines = Vec::new();
        let mut venues = Vec::new();

        for rec in recommendations {
            let stop_name = coerce::string(rec.get("stop_name")).unwrap_or_default();
            let Some(stop) = ctx.find_stop(&stop_name) else {
                if ctx.options.strict_recommendations {
                    return ToolResult::error(ctx.stop_not_found(&stop_name));
                }
                warn!(%stop_name, "recommendations: stop not found, skipping");
                lines.push(format!("⚠️ Stop \"{}\" not found, skipped", stop_name));
                continue;
            };

            let raw_venues: &[Value] = coerce::array(rec.get(self.kind.list_key()))
                .map(Vec::as_slice)
                .unwrap_or_default();
            let added: Vec<Activity> = raw_venues.iter().map(|v| self.activity(v, travelers)).collect();
            let names: Vec<&str> = added.iter().map(|a| a.name.as_str()).collect();
            lines.push(format!(
                "Added {} {} spots to {}: {}",
                added.len(),
                self.kind.noun(),
                stop.name,
                names.join(", ")
            ));

            venues.extend(added.iter().map(|a| Venue {
                stop_name: stop_name.clone(),
                restaurant_name: a.name.clone(),
                specialty: a.specialty.clone().unwrap_or_default(),
                description: a.description.clone(),
                category: self.kind.category(),
            }));

            if added.is_empty() {
                continue;
            }
            match grouped.iter_mut().find(|(id, _)| *id == stop.id) {
                Some((_, activities)) => activities.extend(added),
                None => {
                    let mut activities = stop.activities.clone();
                    activities.extend(added);
                    grouped.push((stop.id.clone(), activities));
                }
            }
        }

        let actions = grouped
            .into_iter()
            .map(|(stop_id, activities)| TripAction::UpdateStop {
                stop_id,
                patch: StopPatch {
                    activities: Some(activities),
                    ..Default::default()
                },
            })
            .collect();

        let content = format!("{} {}", lines.join("\n"), self.kind.emoji());
        ToolResult::success(content, actions).with_venues(venues)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::InterpreterOptions;
    use crate::tools::builtin::test_support::trip;
    use crate::trip::{SequentialIds, apply};

    #[test]
    fn test_burger_recommendations_append_and_skip() {
        let mut doc = trip(&["Paris", "Lyon"]);
        doc.metadata.travelers = Some(2);
        doc.stops[0].activities.push(Activity::named("Louvre"));
        let ids = SequentialIds::new();
        let ctx = ToolContext::new(&doc, &ids, InterpreterOptions::default());

        let result = RecommendationTool::burger().interpret(
            &json!({"recommendations": [
                {"stop_name": "Paris", "burgers": [
                    {"restaurant_name": "Big Fernand", "specialty": "Le Bartholomé", "cost_estimate": 15}
                ]},
                {"stop_name": "Berlin", "burgers": [
                    {"restaurant_name": "Burgermeister", "specialty": "Classic", "cost_estimate": 8}
                ]}
            ]}),
            &ctx,
        );

        assert!(!result.is_error);
        assert_eq!(
            result.content,
            "Added 1 burger spots to Paris: Big Fernand\n⚠️ Stop \"Berlin\" not found, skipped 🍔"
        );
        assert_eq!(result.actions.len(), 1);
        match &result.actions[0] {
            TripAction::UpdateStop { stop_id, patch } => {
                assert_eq!(stop_id, "stop-1");
                let activities = patch.activities.as_ref().unwrap();
                assert_eq!(activities.len(), 2);
                assert_eq!(activities[0].name, "Louvre");
                assert_eq!(activities[1].cost_estimate, Some(30.0));
                assert_eq!(activities[1].duration_hours, Some(1.0));
                assert_eq!(activities[1].category, Some(ActivityCategory::Burger));
            }
            other => panic!("Unexpected action: {:?}", other),
        }
        assert_eq!(result.venues.len(), 1);
    }

    #[test]
    fn test_repeated_stop_entries_accumulate() {
        let mut doc = trip(&["Paris", "Lyon"]);
        doc.stops[0].activities.push(Activity::named("Louvre"));
        let ids = SequentialIds::new();
        let ctx = ToolContext::new(&doc, &ids, InterpreterOptions::default());

        let result = RecommendationTool::burger().interpret(
            &json!({"recommendations": [
                {"stop_name": "Paris", "burgers": [
                    {"restaurant_name": "Big Fernand", "specialty": "Le Bartholomé", "cost_estimate": 15}
                ]},
                {"stop_name": "Lyon", "burgers": [
                    {"restaurant_name": "Ninkasi", "specialty": "Craft burger", "cost_estimate": 14}
                ]},
                {"stop_name": "paris", "burgers": [
                    {"restaurant_name": "Blend", "specialty": "Cheese", "cost_estimate": 13}
                ]}
            ]}),
            &ctx,
        );

        assert!(!result.is_error);
        assert_eq!(result.actions.len(), 2);
        assert_eq!(result.venues.len(), 3);

        let doc = result
            .actions
            .iter()
            .cloned()
            .fold(doc.clone(), |doc, action| apply(doc, action, &ids));
        let names: Vec<&str> = doc.stops[0].activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Louvre", "Big Fernand", "Blend"]);
        assert_eq!(doc.stops[1].activities.len(), 1);
        assert_eq!(doc.stops[1].activities[0].name, "Ninkasi");
    }

    #[test]
    fn test_fondue_duration_and_suffix() {
        let doc = trip(&["Zermatt"]);
        let ids = SequentialIds::new();
        let ctx = ToolContext::new(&doc, &ids, InterpreterOptions::default());

        let result = RecommendationTool::fondue().interpret(
            &json!({"recommendations": [
                {"stop_name": "zermatt", "fondues": [
                    {"restaurant_name": "Whymper-Stube", "specialty": "Moitié-moitié", "cost_estimate": "32"}
                ]}
            ]}),
            &ctx,
        );

        assert!(result.content.ends_with(" 🧀"));
        match &result.actions[0] {
            TripAction::UpdateStop { patch, .. } => {
                let activity = &patch.activities.as_ref().unwrap()[0];
                assert_eq!(activity.duration_hours, Some(2.0));
                assert_eq!(activity.cost_estimate, Some(32.0));
            }
            other => panic!("Unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_rejects_unknown_stop() {
        let doc = trip(&["Paris"]);
        let ids = SequentialIds::new();
        let options = InterpreterOptions {
            strict_recommendations: true,
        };
        let ctx = ToolContext::new(&doc, &ids, options);

        let result = RecommendationTool::burger().interpret(
            &json!({"recommendations": [
                {"stop_name": "Paris", "burgers": [{"restaurant_name": "A", "specialty": "x", "cost_estimate": 1}]},
                {"stop_name": "Rome", "burgers": []}
            ]}),
            &ctx,
        );

        assert!(result.is_error);
        assert!(result.actions.is_empty());
        assert_eq!(result.content, "Error: Stop \"Rome\" not found. Current stops: Paris");
    }

    #[test]
    fn test_requires_recommendations() {
        let doc = trip(&["Paris"]);
        let ids = SequentialIds::new();
        let ctx = ToolContext::new(&doc, &ids, InterpreterOptions::default());

        let result = RecommendationTool::burger().interpret(&json!({"recommendations": []}), &ctx);
        assert_eq!(result.content, "Error: recommendations array is required and must not be empty.");
    }

    #[test]
    fn test_schema_uses_kind_specific_list_key() {
        let schema = RecommendationTool::fondue().input_schema("CHF");
        let items = &schema["properties"]["recommendations"]["items"];
        assert!(items["properties"]["fondues"].is_object());
        assert_eq!(items["required"][1], "fondues");
        assert_eq!(
            items["properties"]["fondues"]["items"]["properties"]["cost_estimate"]["description"],
            "Cost per person in CHF"
        );
    }
}
