//! Itinerary state
//!
//! The trip document, the actions that mutate it, the pure reducer and the
//! TripStore actor that owns the live document and publishes snapshots.

mod action;
mod ids;
mod persist;
mod reducer;
mod store;
mod types;

pub use action::{MetadataPatch, StopPatch, TripAction};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use persist::{TripPersistence, spawn_autosave};
pub use reducer::apply;
pub use store::{StoreError, TripSnapshot, TripStore};
pub use types::{
    Accommodation, AccommodationType, Activity, ActivityCategory, BurgerAchievement, Coordinates, Geometry, Rarity,
    RouteSegment, Stop, TripDocument, TripMetadata, TripMode,
};
