//! Plain-text rendering of trips and streamed turns

use std::fmt::Write;

use colored::Colorize;

use crate::chat::{ChatEvent, TurnOutcome};
use crate::llm::{Role, StopReason};
use crate::tools::coerce::format_number;
use crate::trip::{AccommodationType, TripDocument, TripMode};

/// Human-readable itinerary
pub fn format_trip(doc: &TripDocument) -> String {
    if doc.stops.is_empty() {
        return "No trip planned yet.".to_string();
    }

    let meta = &doc.metadata;
    let currency = meta.currency.as_deref().unwrap_or("EUR");
    let mut out = String::new();

    let name = if meta.name.is_empty() { "Untitled trip" } else { &meta.name };
    let _ = writeln!(out, "{}", name);
    if let (Some(start), Some(end)) = (&meta.start_date, &meta.end_date) {
        let _ = writeln!(out, "Dates: {} to {}", start, end);
    }
    let _ = write!(out, "Travelers: {}", meta.traveler_count());
    if let Some(budget) = meta.total_budget {
        let _ = write!(out, ", budget: {} {}", format_number(budget), currency);
    }
    out.push('\n');
    if meta.mode == Some(TripMode::BurgerChallenge) {
        let _ = writeln!(
            out,
            "Burger challenge: {} points, {} burgers collected",
            meta.burger_score.unwrap_or(0),
            meta.burgers_collected.len()
        );
    }
    out.push('\n');

    for (i, stop) in doc.stops.iter().enumerate() {
        let _ = write!(out, "{}. {}", i + 1, stop.name);
        if let Some(country) = &stop.country {
            let _ = write!(out, ", {}", country);
        }
        let _ = writeln!(out, " ({} night{})", stop.nights, if stop.nights == 1 { "" } else { "s" });

        if let Some(stay) = &stop.accommodation {
            let _ = write!(out, "   Stay: {} ({})", stay.name, accommodation_label(stay.kind));
            if let Some(cost) = stay.cost_per_night {
                let _ = write!(out, ", {} {}/night", format_number(cost), currency);
            }
            out.push('\n');
        }
        for activity in &stop.activities {
            let _ = write!(out, "   - {}", activity.name);
            if let Some(cost) = activity.cost_estimate {
                let _ = write!(out, " ({} {})", format_number(cost), currency);
            }
            out.push('\n');
        }
    }

    let _ = write!(out, "\nTotal nights: {}", doc.total_nights());
    if !doc.route_segments.is_empty() {
        let km: f64 = doc.route_segments.iter().filter_map(|s| s.distance_km).sum();
        let hours: f64 = doc.route_segments.iter().filter_map(|s| s.duration_hours).sum();
        let ferries = doc.route_segments.iter().filter(|s| s.is_ferry()).count();
        let _ = write!(out, "\nDriving: {} km, {} h", km.round(), format_number((hours * 10.0).round() / 10.0));
        if ferries > 0 {
            let _ = write!(out, ", {} ferry crossing{}", ferries, if ferries == 1 { "" } else { "s" });
        }
    }
    out
}

fn accommodation_label(kind: AccommodationType) -> &'static str {
    match kind {
        AccommodationType::Hotel => "hotel",
        AccommodationType::Hostel => "hostel",
        AccommodationType::Airbnb => "airbnb",
        AccommodationType::Camping => "camping",
        AccommodationType::Other => "other",
    }
}

/// Turns chat events into incremental terminal output
///
/// Committed text arrives as the full message so far; only the unseen
/// suffix is printed.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    message_id: Option<String>,
    printed: usize,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output for one event, if any
    pub fn render(&mut self, event: &ChatEvent) -> Option<String> {
        match event {
            ChatEvent::MessageAppended { id, role: Role::Assistant } => {
                let separate = self.printed > 0;
                self.message_id = Some(id.clone());
                self.printed = 0;
                separate.then(|| "\n".to_string())
            }
            ChatEvent::TextCommitted { message_id, text } if self.message_id.as_ref() == Some(message_id) => {
                let fresh = text.get(self.printed..).filter(|s| !s.is_empty())?.to_string();
                self.printed = text.len();
                Some(fresh)
            }
            ChatEvent::ToolApplied { call, .. } => {
                let label = format!("[{}]", call.name);
                let line = if call.is_error {
                    format!("\n{} {}\n", label.dimmed(), call.result_text().red())
                } else {
                    format!("\n{} {}\n", label.dimmed(), call.result_text().dimmed())
                };
                Some(line)
            }
            ChatEvent::TurnFinished(TurnOutcome::Cancelled) => Some(format!("\n{}", "[stopped]".yellow())),
            ChatEvent::TurnFinished(TurnOutcome::Completed {
                stop_reason: Some(StopReason::MaxTokens),
                ..
            }) => Some(format!("\n{}", "[Response truncated - max tokens reached]".yellow())),
            _ => None,
        }
    }
}
