//! Trip actions - the closed set of mutations the reducer accepts

use tracing::debug;

use super::types::{Accommodation, Activity, BurgerAchievement, Coordinates, RouteSegment, Stop, TripDocument, TripMetadata, TripMode};

/// Partial update of a stop; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopPatch {
    pub name: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub country: Option<String>,
    pub nights: Option<u32>,
    pub activities: Option<Vec<Activity>>,
    pub accommodation: Option<Accommodation>,
    pub daily_budget: Option<f64>,
    pub notes: Option<String>,
}

impl StopPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow merge into a stop (id is never touched)
    pub fn apply_to(&self, stop: &mut Stop) {
        debug!(stop_id = %stop.id, "StopPatch::apply_to: called");
        if let Some(name) = &self.name {
            stop.name = name.clone();
        }
        if let Some(coordinates) = self.coordinates {
            stop.coordinates = coordinates;
        }
        if let Some(country) = &self.country {
            stop.country = Some(country.clone());
        }
        if let Some(nights) = self.nights {
            stop.nights = nights;
        }
        if let Some(activities) = &self.activities {
            stop.activities = activities.clone();
        }
        if let Some(accommodation) = &self.accommodation {
            stop.accommodation = Some(accommodation.clone());
        }
        if let Some(daily_budget) = self.daily_budget {
            stop.daily_budget = Some(daily_budget);
        }
        if let Some(notes) = &self.notes {
            stop.notes = Some(notes.clone());
        }
    }
}

/// Partial update of trip metadata; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataPatch {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub travelers: Option<u32>,
    pub total_budget: Option<f64>,
    pub currency: Option<String>,
    pub mode: Option<TripMode>,
    pub burger_score: Option<u32>,
    pub burgers_collected: Option<Vec<BurgerAchievement>>,
    pub food_query: Option<String>,
}

impl MetadataPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the fields this patch sets, in declaration order
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.name.is_some() {
            names.push("name");
        }
        if self.start_date.is_some() {
            names.push("start_date");
        }
        if self.end_date.is_some() {
            names.push("end_date");
        }
        if self.travelers.is_some() {
            names.push("travelers");
        }
        if self.total_budget.is_some() {
            names.push("total_budget");
        }
        if self.currency.is_some() {
            names.push("currency");
        }
        if self.mode.is_some() {
            names.push("mode");
        }
        if self.burger_score.is_some() {
            names.push("burger_score");
        }
        if self.burgers_collected.is_some() {
            names.push("burgers_collected");
        }
        if self.food_query.is_some() {
            names.push("food_query");
        }
        names
    }

    pub fn apply_to(&self, meta: &mut TripMetadata) {
        debug!(fields = ?self.field_names(), "MetadataPatch::apply_to: called");
        if let Some(name) = &self.name {
            meta.name = name.clone();
        }
        if let Some(start_date) = &self.start_date {
            meta.start_date = Some(start_date.clone());
        }
        if let Some(end_date) = &self.end_date {
            meta.end_date = Some(end_date.clone());
        }
        if let Some(travelers) = self.travelers {
            meta.travelers = Some(travelers);
        }
        if let Some(total_budget) = self.total_budget {
            meta.total_budget = Some(total_budget);
        }
        if let Some(currency) = &self.currency {
            meta.currency = Some(currency.clone());
        }
        if let Some(mode) = self.mode {
            meta.mode = Some(mode);
        }
        if let Some(score) = self.burger_score {
            meta.burger_score = Some(score);
        }
        if let Some(collected) = &self.burgers_collected {
            meta.burgers_collected = collected.clone();
        }
        if let Some(food_query) = &self.food_query {
            meta.food_query = Some(food_query.clone());
        }
    }
}

/// A named mutation of the trip document
#[derive(Debug, Clone, PartialEq)]
pub enum TripAction {
    SetRoute(Vec<Stop>),
    AddStop { stop: Stop, position: Option<usize> },
    RemoveStop(String),
    UpdateStop { stop_id: String, patch: StopPatch },
    ReorderStops(Vec<String>),
    UpdateTripMetadata(MetadataPatch),
    SetRouteSegments(Vec<RouteSegment>),
    SetSelectedStop(Option<String>),
    LoadState(Box<TripDocument>),
    Reset,
}

impl TripAction {
    /// Whether this action changes stop membership or order
    pub fn changes_topology(&self) -> bool {
        matches!(
            self,
            TripAction::SetRoute(_)
                | TripAction::AddStop { .. }
                | TripAction::RemoveStop(_)
                | TripAction::ReorderStops(_)
                | TripAction::LoadState(_)
                | TripAction::Reset
        )
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            TripAction::SetRoute(_) => "SetRoute",
            TripAction::AddStop { .. } => "AddStop",
            TripAction::RemoveStop(_) => "RemoveStop",
            TripAction::UpdateStop { .. } => "UpdateStop",
            TripAction::ReorderStops(_) => "ReorderStops",
            TripAction::UpdateTripMetadata(_) => "UpdateTripMetadata",
            TripAction::SetRouteSegments(_) => "SetRouteSegments",
            TripAction::SetSelectedStop(_) => "SetSelectedStop",
            TripAction::LoadState(_) => "LoadState",
            TripAction::Reset => "Reset",
        }
    }
}
