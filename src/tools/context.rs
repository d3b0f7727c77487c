//! ToolContext - what a tool may read while interpreting a call

use tracing::debug;

use crate::trip::{IdGenerator, Stop, TripDocument};

/// Interpreter behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Reject a whole recommendation call when any stop name is unknown
    pub strict_recommendations: bool,
}

/// Read-only view handed to each tool
///
/// `document` is the snapshot taken right before the call, so it already
/// reflects every earlier call of the same response.
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    pub document: &'a TripDocument,
    pub ids: &'a dyn IdGenerator,
    pub options: InterpreterOptions,
}

impl<'a> ToolContext<'a> {
    pub fn new(document: &'a TripDocument, ids: &'a dyn IdGenerator, options: InterpreterOptions) -> Self {
        debug!(stops = document.stops.len(), ?options, "ToolContext::new: called");
        Self { document, ids, options }
    }

    pub fn find_stop(&self, name: &str) -> Option<&'a Stop> {
        self.document.find_stop_by_name(name)
    }

    /// Error text for a stop name that did not resolve
    pub fn stop_not_found(&self, name: &str) -> String {
        format!(
            "Error: Stop \"{}\" not found. Current stops: {}",
            name,
            self.document.stop_names()
        )
    }

    pub fn travelers(&self) -> u32 {
        self.document.metadata.traveler_count()
    }
}
