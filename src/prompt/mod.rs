//! System prompt rendering
//!
//! The prompt is a Handlebars template rendered from the live trip document
//! on every request, so the model always sees the current itinerary.

mod embedded;

use std::path::Path;

use eyre::{Context, Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{ChatConfig, PromptConfig};
use crate::trip::{TripDocument, TripMode};

pub use embedded::SYSTEM_TEMPLATE;

/// Per-user settings rendered into the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOptions {
    pub language: String,
    pub currency: String,
    pub user_location: Option<String>,
}

impl PromptOptions {
    pub fn from_config(chat: &ChatConfig) -> Self {
        Self {
            language: chat.language.clone(),
            currency: chat.currency.clone(),
            user_location: chat.user_location.clone(),
        }
    }
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            currency: "EUR".to_string(),
            user_location: None,
        }
    }
}

/// Values the template sees
#[derive(Debug, Serialize)]
struct PromptContext<'a> {
    currency: &'a str,
    language: &'a str,
    non_english: bool,
    user_location: Option<&'a str>,
    burger_challenge: bool,
    burger_score: u32,
    burgers_collected: usize,
    trip_context: String,
}

/// Renders the trip planner system prompt
pub struct SystemPrompt {
    hbs: Handlebars<'static>,
    template: String,
}

impl SystemPrompt {
    /// Prompt backed by the embedded template
    pub fn embedded() -> Self {
        Self::from_template(SYSTEM_TEMPLATE)
    }

    pub fn from_template(template: impl Into<String>) -> Self {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        Self {
            hbs,
            template: template.into(),
        }
    }

    /// Load the template override if configured, else the embedded one
    pub fn from_config(config: &PromptConfig) -> Result<Self> {
        match &config.template_file {
            Some(path) => Self::from_file(path),
            None => Ok(Self::embedded()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading system prompt template");
        let template = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template {}", path.display()))?;
        Ok(Self::from_template(template))
    }

    /// Render the prompt for the current trip
    pub fn render(&self, doc: &TripDocument, options: &PromptOptions) -> Result<String> {
        debug!(stops = doc.stops.len(), language = %options.language, "SystemPrompt::render: called");
        let metadata = &doc.metadata;
        let context = PromptContext {
            currency: if options.currency.is_empty() { "EUR" } else { &options.currency },
            language: &options.language,
            non_english: !options.language.is_empty() && options.language != "English",
            user_location: options.user_location.as_deref().filter(|l| !l.is_empty()),
            burger_challenge: metadata.mode == Some(TripMode::BurgerChallenge),
            burger_score: metadata.burger_score.unwrap_or(0),
            burgers_collected: metadata.burgers_collected.len(),
            trip_context: trip_summary(doc)?,
        };

        self.hbs
            .render_template(&self.template, &context)
            .map_err(|e| eyre!("Failed to render system prompt: {}", e))
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Compact JSON summary of the trip, or a note that there is none
pub fn trip_summary(doc: &TripDocument) -> Result<String> {
    if doc.stops.is_empty() {
        return Ok("No trip planned yet.".to_string());
    }

    let stops: Vec<_> = doc
        .stops
        .iter()
        .enumerate()
        .map(|(position, stop)| {
            json!({
                "position": position,
                "name": stop.name,
                "country": stop.country,
                "nights": stop.nights,
                "activities": stop.activities.len(),
                "has_accommodation": stop.accommodation.is_some(),
            })
        })
        .collect();

    let summary = json!({ "metadata": doc.metadata, "stops": stops });
    serde_json::to_string_pretty(&summary).context("Failed to serialize trip summary")
}
