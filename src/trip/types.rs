//! Trip document types
//!
//! The itinerary is a single document: trip metadata, an ordered list of stops
//! and the route segments derived from consecutive stops.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Geographic position of a stop
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON position order: `[lng, lat]`
    pub fn to_position(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// Activity category vocabulary (includes the food-mode tags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Sightseeing,
    Food,
    Adventure,
    Culture,
    Relaxation,
    Nightlife,
    Shopping,
    Burger,
    Fondue,
}

impl ActivityCategory {
    /// Parse a category tag, returning None for anything outside the vocabulary
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sightseeing" => Some(Self::Sightseeing),
            "food" => Some(Self::Food),
            "adventure" => Some(Self::Adventure),
            "culture" => Some(Self::Culture),
            "relaxation" => Some(Self::Relaxation),
            "nightlife" => Some(Self::Nightlife),
            "shopping" => Some(Self::Shopping),
            "burger" => Some(Self::Burger),
            "fondue" => Some(Self::Fondue),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sightseeing => "sightseeing",
            Self::Food => "food",
            Self::Adventure => "adventure",
            Self::Culture => "culture",
            Self::Relaxation => "relaxation",
            Self::Nightlife => "nightlife",
            Self::Shopping => "shopping",
            Self::Burger => "burger",
            Self::Fondue => "fondue",
        }
    }
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Something to do at a stop
///
/// `cost_estimate` is always the total for the whole group, never per person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ActivityCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Suggested time of day ("Lunch", "Dinner")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl Activity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Accommodation kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccommodationType {
    Hotel,
    Hostel,
    Airbnb,
    Camping,
    #[default]
    Other,
}

impl AccommodationType {
    /// Parse an accommodation type; anything unknown maps to `Other`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "hotel" => Self::Hotel,
            "hostel" => Self::Hostel,
            "airbnb" => Self::Airbnb,
            "camping" => Self::Camping,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: AccommodationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_night: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A waypoint in the itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Unique id, assigned at creation and never reused
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default = "default_nights")]
    pub nights: u32,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<Accommodation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_nights() -> u32 {
    1
}

impl Stop {
    /// Create a stop without an id; the reducer assigns one on insert
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            coordinates,
            country: None,
            nights: 1,
            activities: Vec::new(),
            accommodation: None,
            daily_budget: None,
            notes: None,
        }
    }

    /// Case-insensitive exact name comparison
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// GeoJSON geometry of a route segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<[f64; 2]> },
}

impl Geometry {
    /// Straight line between two coordinates
    pub fn straight(from: Coordinates, to: Coordinates) -> Self {
        Geometry::LineString {
            coordinates: vec![from.to_position(), to.to_position()],
        }
    }

    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Geometry::LineString { coordinates } => coordinates,
        }
    }
}

/// Travel path between two consecutive stops
///
/// A segment without geometry is an "unknown path" placeholder. A straight
/// line with `is_ferry` set is the fallback used when routing fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub from_stop_id: String,
    pub to_stop_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ferry: Option<bool>,
}

impl RouteSegment {
    pub fn placeholder(from_stop_id: impl Into<String>, to_stop_id: impl Into<String>) -> Self {
        Self {
            from_stop_id: from_stop_id.into(),
            to_stop_id: to_stop_id.into(),
            geometry: None,
            distance_km: None,
            duration_hours: None,
            is_ferry: None,
        }
    }

    /// Straight-line segment flagged as a ferry/indirect link
    pub fn straight_fallback(from: &Stop, to: &Stop) -> Self {
        Self {
            from_stop_id: from.id.clone(),
            to_stop_id: to.id.clone(),
            geometry: Some(Geometry::straight(from.coordinates, to.coordinates)),
            distance_km: None,
            duration_hours: None,
            is_ferry: Some(true),
        }
    }

    pub fn is_ferry(&self) -> bool {
        self.is_ferry.unwrap_or(false)
    }

    /// Copy without geometry (used when persisting)
    pub fn without_geometry(&self) -> Self {
        Self {
            geometry: None,
            ..self.clone()
        }
    }
}

/// Planning mode chosen at the start of a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripMode {
    Standard,
    BurgerChallenge,
}

impl std::str::FromStr for TripMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "burger" | "burger_challenge" | "burger-challenge" => Ok(Self::BurgerChallenge),
            _ => Err(format!("Unknown mode: {}. Use: standard or burger", s)),
        }
    }
}

/// Rarity of a collected burger spot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
}

impl Rarity {
    /// Points awarded for collecting a spot of this rarity
    pub fn points(&self) -> u32 {
        match self {
            Rarity::Common => 2,
            Rarity::Rare => 5,
            Rarity::Legendary => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurgerAchievement {
    pub city: String,
    pub restaurant_name: String,
    pub specialty: String,
    pub rarity: Rarity,
    pub collected: bool,
}

/// Trip-level fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travelers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<TripMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burger_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub burgers_collected: Vec<BurgerAchievement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_query: Option<String>,
}

impl TripMetadata {
    /// Traveler count used for group cost totals (defaults to 1)
    pub fn traveler_count(&self) -> u32 {
        self.travelers.filter(|t| *t > 0).unwrap_or(1)
    }
}

/// The root itinerary document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripDocument {
    #[serde(default)]
    pub metadata: TripMetadata,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub route_segments: Vec<RouteSegment>,
    #[serde(rename = "selectedStopId", default)]
    pub selected_stop_id: Option<String>,
}

impl TripDocument {
    /// Find a stop by case-insensitive exact name
    pub fn find_stop_by_name(&self, name: &str) -> Option<&Stop> {
        debug!(%name, "find_stop_by_name: called");
        self.stops.iter().find(|s| s.matches_name(name))
    }

    pub fn find_stop(&self, id: &str) -> Option<&Stop> {
        self.stops.iter().find(|s| s.id == id)
    }

    /// Comma-separated stop names, used in error results for the model
    pub fn stop_names(&self) -> String {
        self.stops.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", ")
    }

    /// Ordered consecutive stop pairs
    pub fn consecutive_pairs(&self) -> impl Iterator<Item = (&Stop, &Stop)> {
        self.stops.windows(2).map(|w| (&w[0], &w[1]))
    }

    pub fn total_nights(&self) -> u32 {
        self.stops.iter().map(|s| s.nights).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}
