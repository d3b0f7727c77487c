//! Pure reduction function over the trip document

use std::collections::HashSet;

use tracing::debug;

use super::action::TripAction;
use super::ids::IdGenerator;
use super::types::{Stop, TripDocument};

fn ensure_id(mut stop: Stop, ids: &dyn IdGenerator) -> Stop {
    if stop.id.is_empty() {
        stop.id = ids.next_id();
    }
    stop
}

/// Apply an action to a document, producing the next document
///
/// Every action that changes stop membership or order clears the derived
/// route segments in the same transition.
pub fn apply(mut doc: TripDocument, action: TripAction, ids: &dyn IdGenerator) -> TripDocument {
    debug!(action = action.kind(), stops = doc.stops.len(), "apply: called");
    match action {
        TripAction::SetRoute(stops) => {
            doc.stops = stops.into_iter().map(|s| ensure_id(s, ids)).collect();
            doc.route_segments.clear();
        }
        TripAction::AddStop { stop, position } => {
            let stop = ensure_id(stop, ids);
            match position {
                Some(pos) if pos <= doc.stops.len() => {
                    debug!(%pos, "apply: AddStop inserting at position");
                    doc.stops.insert(pos, stop);
                }
                _ => {
                    debug!("apply: AddStop appending");
                    doc.stops.push(stop);
                }
            }
            doc.route_segments.clear();
        }
        TripAction::RemoveStop(stop_id) => {
            doc.stops.retain(|s| s.id != stop_id);
            doc.route_segments.clear();
        }
        TripAction::UpdateStop { stop_id, patch } => match doc.stops.iter_mut().find(|s| s.id == stop_id) {
            Some(stop) => patch.apply_to(stop),
            None => debug!(%stop_id, "apply: UpdateStop id not found, ignoring"),
        },
        TripAction::ReorderStops(ordered_ids) => {
            let named: HashSet<&str> = ordered_ids.iter().map(String::as_str).collect();
            let (mut listed, remaining): (Vec<Stop>, Vec<Stop>) =
                std::mem::take(&mut doc.stops).into_iter().partition(|s| named.contains(s.id.as_str()));

            let mut reordered = Vec::with_capacity(listed.len() + remaining.len());
            for id in &ordered_ids {
                if let Some(idx) = listed.iter().position(|s| &s.id == id) {
                    reordered.push(listed.remove(idx));
                }
            }
            reordered.extend(remaining);
            doc.stops = reordered;
            doc.route_segments.clear();
        }
        TripAction::UpdateTripMetadata(patch) => patch.apply_to(&mut doc.metadata),
        TripAction::SetRouteSegments(segments) => doc.route_segments = segments,
        TripAction::SetSelectedStop(stop_id) => doc.selected_stop_id = stop_id,
        TripAction::LoadState(next) => doc = *next,
        TripAction::Reset => doc = TripDocument::default(),
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::action::{MetadataPatch, StopPatch};
    use crate::trip::ids::SequentialIds;
    use crate::trip::types::{Coordinates, RouteSegment};
    use proptest::prelude::*;

    fn stop(name: &str) -> Stop {
        Stop::new(name, Coordinates::new(0.0, 0.0))
    }

    fn three_stops(ids: &SequentialIds) -> TripDocument {
        let doc = apply(
            TripDocument::default(),
            TripAction::SetRoute(vec![stop("A"), stop("B"), stop("C")]),
            ids,
        );
        apply(
            doc,
            TripAction::SetRouteSegments(vec![RouteSegment::placeholder("stop-1", "stop-2")]),
            ids,
        )
    }

    fn names(doc: &TripDocument) -> Vec<&str> {
        doc.stops.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_set_route_assigns_missing_ids_only() {
        let ids = SequentialIds::new();
        let mut keep = stop("Keep");
        keep.id = "fixed".to_string();

        let doc = apply(TripDocument::default(), TripAction::SetRoute(vec![keep, stop("New")]), &ids);

        assert_eq!(doc.stops[0].id, "fixed");
        assert_eq!(doc.stops[1].id, "stop-1");
    }

    #[test]
    fn test_add_stop_position_clamped() {
        let ids = SequentialIds::new();
        let doc = three_stops(&ids);

        let doc = apply(
            doc,
            TripAction::AddStop {
                stop: stop("First"),
                position: Some(0),
            },
            &ids,
        );
        assert_eq!(names(&doc), vec!["First", "A", "B", "C"]);
        assert!(doc.route_segments.is_empty());

        let doc = apply(
            doc,
            TripAction::AddStop {
                stop: stop("Far"),
                position: Some(99),
            },
            &ids,
        );
        assert_eq!(names(&doc).last(), Some(&"Far"));
    }

    #[test]
    fn test_remove_missing_stop_is_silent() {
        let ids = SequentialIds::new();
        let doc = three_stops(&ids);
        let doc = apply(doc, TripAction::RemoveStop("nope".to_string()), &ids);
        assert_eq!(doc.stops.len(), 3);
        assert!(doc.route_segments.is_empty());
    }

    #[test]
    fn test_update_stop_keeps_segments() {
        let ids = SequentialIds::new();
        let doc = three_stops(&ids);
        let doc = apply(
            doc,
            TripAction::UpdateStop {
                stop_id: "stop-2".to_string(),
                patch: StopPatch {
                    nights: Some(4),
                    ..Default::default()
                },
            },
            &ids,
        );
        assert_eq!(doc.stops[1].nights, 4);
        assert_eq!(doc.route_segments.len(), 1);
    }

    #[test]
    fn test_reorder_subset_appends_remaining() {
        let ids = SequentialIds::new();
        let doc = three_stops(&ids);
        let doc = apply(doc, TripAction::ReorderStops(vec!["stop-3".to_string()]), &ids);
        assert_eq!(names(&doc), vec!["C", "A", "B"]);
        assert!(doc.route_segments.is_empty());
    }

    #[test]
    fn test_reorder_ignores_unknown_ids() {
        let ids = SequentialIds::new();
        let doc = three_stops(&ids);
        let doc = apply(
            doc,
            TripAction::ReorderStops(vec!["ghost".to_string(), "stop-2".to_string()]),
            &ids,
        );
        assert_eq!(names(&doc), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_metadata_merges_are_cumulative() {
        let ids = SequentialIds::new();
        let doc = apply(
            TripDocument::default(),
            TripAction::UpdateTripMetadata(MetadataPatch {
                name: Some("Alps".to_string()),
                ..Default::default()
            }),
            &ids,
        );
        let doc = apply(
            doc,
            TripAction::UpdateTripMetadata(MetadataPatch {
                travelers: Some(3),
                ..Default::default()
            }),
            &ids,
        );
        assert_eq!(doc.metadata.name, "Alps");
        assert_eq!(doc.metadata.travelers, Some(3));
    }

    #[test]
    fn test_selection_load_and_reset() {
        let ids = SequentialIds::new();
        let doc = three_stops(&ids);
        let doc = apply(doc, TripAction::SetSelectedStop(Some("stop-1".to_string())), &ids);
        assert_eq!(doc.selected_stop_id.as_deref(), Some("stop-1"));

        let loaded = apply(doc.clone(), TripAction::LoadState(Box::new(TripDocument::default())), &ids);
        assert!(loaded.stops.is_empty());

        let reset = apply(doc, TripAction::Reset, &ids);
        assert_eq!(reset, TripDocument::default());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(Option<usize>),
        Remove(usize),
        Reorder(Vec<usize>),
        SetRoute(usize),
        Update(usize, u32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            proptest::option::of(0usize..8).prop_map(Op::Add),
            (0usize..8).prop_map(Op::Remove),
            proptest::collection::vec(0usize..8, 0..6).prop_map(Op::Reorder),
            (1usize..5).prop_map(Op::SetRoute),
            ((0usize..8), (1u32..10)).prop_map(|(i, n)| Op::Update(i, n)),
        ]
    }

    proptest! {
        #[test]
        fn prop_topology_actions_clear_segments(ops in proptest::collection::vec(op_strategy(), 1..25)) {
            let ids = SequentialIds::new();
            let mut doc = TripDocument::default();
            for op in ops {
                // Pretend a fetch completed so clearing is observable
                let segments = vec![RouteSegment::placeholder("a", "b")];
                doc = apply(doc, TripAction::SetRouteSegments(segments), &ids);

                let id_at = |doc: &TripDocument, i: usize| {
                    doc.stops.get(i % doc.stops.len().max(1)).map(|s| s.id.clone()).unwrap_or_default()
                };
                match op {
                    Op::Add(position) => {
                        doc = apply(doc, TripAction::AddStop { stop: stop("X"), position }, &ids);
                        prop_assert!(doc.route_segments.is_empty());
                    }
                    Op::Remove(i) => {
                        let id = id_at(&doc, i);
                        doc = apply(doc, TripAction::RemoveStop(id), &ids);
                        prop_assert!(doc.route_segments.is_empty());
                    }
                    Op::Reorder(order) => {
                        let before: HashSet<String> = doc.stops.iter().map(|s| s.id.clone()).collect();
                        let wanted: Vec<String> = order.iter().map(|i| id_at(&doc, *i)).collect();
                        doc = apply(doc, TripAction::ReorderStops(wanted), &ids);
                        let after: HashSet<String> = doc.stops.iter().map(|s| s.id.clone()).collect();
                        prop_assert_eq!(before, after);
                        prop_assert!(doc.route_segments.is_empty());
                    }
                    Op::SetRoute(n) => {
                        let stops = (0..n).map(|i| stop(&format!("S{}", i))).collect();
                        doc = apply(doc, TripAction::SetRoute(stops), &ids);
                        prop_assert!(doc.route_segments.is_empty());
                    }
                    Op::Update(i, nights) => {
                        let order: Vec<String> = doc.stops.iter().map(|s| s.id.clone()).collect();
                        let id = id_at(&doc, i);
                        let patch = StopPatch { nights: Some(nights), ..Default::default() };
                        doc = apply(doc, TripAction::UpdateStop { stop_id: id, patch }, &ids);
                        let after: Vec<String> = doc.stops.iter().map(|s| s.id.clone()).collect();
                        prop_assert_eq!(order, after);
                        prop_assert_eq!(doc.route_segments.len(), 1);
                    }
                }
            }
        }

        #[test]
        fn prop_reorder_subset_preserves_relative_order(n in 2usize..8, picks in proptest::collection::vec(0usize..8, 0..8)) {
            let ids = SequentialIds::new();
            let stops = (0..n).map(|i| stop(&format!("S{}", i))).collect();
            let doc = apply(TripDocument::default(), TripAction::SetRoute(stops), &ids);
            let all: Vec<String> = doc.stops.iter().map(|s| s.id.clone()).collect();

            let mut wanted: Vec<String> = Vec::new();
            for p in picks {
                let id = all[p % n].clone();
                if !wanted.contains(&id) {
                    wanted.push(id);
                }
            }

            let doc = apply(doc, TripAction::ReorderStops(wanted.clone()), &ids);
            let got: Vec<String> = doc.stops.iter().map(|s| s.id.clone()).collect();
            let expected_tail: Vec<String> = all.iter().filter(|id| !wanted.contains(id)).cloned().collect();

            prop_assert_eq!(&got[..wanted.len()], &wanted[..]);
            prop_assert_eq!(&got[wanted.len()..], &expected_tail[..]);
        }
    }
}
