//! Route segment cache keyed by stop-id pair

use std::collections::HashMap;

use crate::trip::{RouteSegment, Stop};

/// Segments fetched so far, reused across stop-list changes
///
/// Keys are directed: A→B and B→A are separate entries.
#[derive(Debug, Default)]
pub struct SegmentCache {
    segments: HashMap<(String, String), RouteSegment>,
}

impl SegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, from_id: &str, to_id: &str) -> Option<&RouteSegment> {
        self.segments.get(&(from_id.to_string(), to_id.to_string()))
    }

    pub fn contains(&self, from_id: &str, to_id: &str) -> bool {
        self.get(from_id, to_id).is_some()
    }

    pub fn insert(&mut self, segment: RouteSegment) {
        let key = (segment.from_stop_id.clone(), segment.to_stop_id.clone());
        self.segments.insert(key, segment);
    }

    /// Consecutive pairs of `stops` that still need a lookup
    pub fn missing<'a>(&self, stops: &'a [Stop]) -> Vec<(&'a Stop, &'a Stop)> {
        stops
            .windows(2)
            .map(|w| (&w[0], &w[1]))
            .filter(|(from, to)| !self.contains(&from.id, &to.id))
            .collect()
    }

    /// Ordered segments for `stops`, skipping pairs not cached
    pub fn assemble(&self, stops: &[Stop]) -> Vec<RouteSegment> {
        stops
            .windows(2)
            .filter_map(|w| self.get(&w[0].id, &w[1].id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}
