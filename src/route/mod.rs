//! Route segments between consecutive stops
//!
//! Directions lookups, the per-pair segment cache and the background fetcher
//! that commits ordered segment batches back into the trip store.

mod cache;
mod directions;
mod fetcher;

pub use cache::SegmentCache;
pub use directions::{MapboxDirections, PathLookup, RouteError, haversine_km};
pub use fetcher::{FetcherOptions, RouteFetcher, spawn_route_fetcher};
