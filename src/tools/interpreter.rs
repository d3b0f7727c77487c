//! ToolInterpreter - maps completed tool calls onto trip actions

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::llm::{ToolCall, ToolDefinition};
use crate::trip::{IdGenerator, TripDocument, TripMode};

use super::builtin::{
    AddStopTool, RecommendationTool, RemoveStopTool, ReorderStopsTool, SetRouteTool, UpdateStopTool, UpdateTripTool,
};
use super::hooks::{BurgerChallengeHook, ModeHook};
use super::{InterpreterOptions, Tool, ToolContext, ToolResult};

/// Registry of trip tools plus the per-mode hooks
pub struct ToolInterpreter {
    tools: HashMap<String, Box<dyn Tool>>,
    /// Registration order, used for the schema list
    order: Vec<String>,
    hooks: HashMap<TripMode, Box<dyn ModeHook>>,
    options: InterpreterOptions,
}

impl ToolInterpreter {
    /// Create an interpreter with every trip tool and the burger challenge hook
    pub fn standard(options: InterpreterOptions) -> Self {
        let mut interpreter = Self::empty(options);

        interpreter.add_tool(Box::new(SetRouteTool));
        interpreter.add_tool(Box::new(AddStopTool));
        interpreter.add_tool(Box::new(RemoveStopTool));
        interpreter.add_tool(Box::new(UpdateStopTool));
        interpreter.add_tool(Box::new(ReorderStopsTool));
        interpreter.add_tool(Box::new(UpdateTripTool));
        interpreter.add_tool(Box::new(RecommendationTool::burger()));
        interpreter.add_tool(Box::new(RecommendationTool::fondue()));

        interpreter.add_hook(TripMode::BurgerChallenge, Box::new(BurgerChallengeHook));

        interpreter
    }

    /// Create an empty interpreter (for testing)
    pub fn empty(options: InterpreterOptions) -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            hooks: HashMap::new(),
            options,
        }
    }

    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn add_hook(&mut self, mode: TripMode, hook: Box<dyn ModeHook>) {
        self.hooks.insert(mode, hook);
    }

    pub fn options(&self) -> InterpreterOptions {
        self.options
    }

    /// Tool schemas offered to the model, in registration order
    pub fn definitions(&self, currency: &str) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema(currency)))
            .collect()
    }

    /// Interpret one completed call against a document snapshot
    ///
    /// Never panics on bad input: unknown tools and malformed arguments come
    /// back as result text for the model.
    pub fn interpret(&self, call: &ToolCall, doc: &TripDocument, ids: &dyn IdGenerator) -> ToolResult {
        debug!(id = %call.id, name = %call.name, "interpret: called");
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(name = %call.name, "interpret: unknown tool");
            return ToolResult::error(format!("Unknown tool: {}", call.name));
        };

        let ctx = ToolContext::new(doc, ids, self.options);
        let mut result = tool.interpret(&call.input, &ctx);

        if let Some(hook) = doc.metadata.mode.and_then(|mode| self.hooks.get(&mode)) {
            let extra = hook.after_tool(&call.name, &result, doc);
            debug!(count = extra.len(), "interpret: mode hook actions");
            result.actions.extend(extra);
        }

        debug!(actions = result.actions.len(), is_error = result.is_error, "interpret: done");
        result
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }
}

impl Default for ToolInterpreter {
    fn default() -> Self {
        Self::standard(InterpreterOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin::test_support::trip;
    use crate::trip::{SequentialIds, TripAction, apply};
    use serde_json::json;

    fn call(name: &str, input: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "toolu_1".to_string(),
            name: name.to_string(),
            input,
        }
    }

    #[test]
    fn test_standard_interpreter_has_all_tools() {
        let interpreter = ToolInterpreter::default();
        assert_eq!(
            interpreter.tool_names(),
            vec![
                "set_route",
                "add_stop",
                "remove_stop",
                "update_stop",
                "reorder_stops",
                "update_trip",
                "add_burger_recommendations",
                "add_fondue_recommendations"
            ]
        );
    }

    #[test]
    fn test_definitions_carry_currency() {
        let interpreter = ToolInterpreter::default();
        let defs = interpreter.definitions("SEK");
        assert_eq!(defs.len(), 8);
        assert_eq!(defs[0].name, "set_route");
        assert_eq!(
            defs[0].input_schema["properties"]["total_budget"]["description"],
            "Total trip budget in SEK"
        );
    }

    #[test]
    fn test_unknown_tool() {
        let interpreter = ToolInterpreter::default();
        let doc = trip(&["Paris"]);
        let result = interpreter.interpret(&call("teleport", json!({})), &doc, &SequentialIds::new());
        assert!(result.actions.is_empty());
        assert_eq!(result.content, "Unknown tool: teleport");
    }

    #[test]
    fn test_interpret_is_deterministic() {
        let interpreter = ToolInterpreter::default();
        let doc = trip(&["Paris", "Lyon"]);
        let input = json!({"stops": [{"name": "Oslo", "lat": 59.9, "lng": 10.7, "nights": 2}], "trip_name": "North"});

        let first = interpreter.interpret(&call("set_route", input.clone()), &doc, &SequentialIds::new());
        let second = interpreter.interpret(&call("set_route", input), &doc, &SequentialIds::new());
        assert_eq!(first, second);
    }

    #[test]
    fn test_burger_mode_appends_score_update() {
        let interpreter = ToolInterpreter::default();
        let mut doc = trip(&["Paris"]);
        doc.metadata.mode = Some(TripMode::BurgerChallenge);

        let result = interpreter.interpret(
            &call(
                "add_burger_recommendations",
                json!({"recommendations": [{"stop_name": "Paris", "burgers": [
                    {"restaurant_name": "Blend", "specialty": "Cheese", "cost_estimate": 14, "description": "Legendary!"}
                ]}]}),
            ),
            &doc,
            &SequentialIds::new(),
        );

        assert_eq!(result.actions.len(), 2);
        assert!(matches!(
            &result.actions[1],
            TripAction::UpdateTripMetadata(patch) if patch.burger_score == Some(10)
        ));
    }

    #[test]
    fn test_standard_mode_has_no_hook_actions() {
        let interpreter = ToolInterpreter::default();
        let doc = trip(&["Paris"]);
        let result = interpreter.interpret(
            &call(
                "add_burger_recommendations",
                json!({"recommendations": [{"stop_name": "Paris", "burgers": [
                    {"restaurant_name": "Blend", "specialty": "Cheese", "cost_estimate": 14, "description": "Legendary!"}
                ]}]}),
            ),
            &doc,
            &SequentialIds::new(),
        );
        assert_eq!(result.actions.len(), 1);
    }

    /// Remove-then-update in one response: the second call sees the first's effect
    #[test]
    fn test_sequential_calls_against_fresh_snapshots() {
        let interpreter = ToolInterpreter::default();
        let ids = SequentialIds::new();
        let doc = trip(&["A", "B", "C"]);

        let removed = interpreter.interpret(&call("remove_stop", json!({"name": "B"})), &doc, &ids);
        let doc = removed
            .actions
            .into_iter()
            .fold(doc, |doc, action| apply(doc, action, &ids));

        let updated = interpreter.interpret(&call("update_stop", json!({"name": "B", "nights": 2})), &doc, &ids);
        assert_eq!(updated.content, "Error: Stop \"B\" not found. Current stops: A, C");
        assert!(updated.actions.is_empty());
    }
}
