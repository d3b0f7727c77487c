//! Trip persistence
//!
//! The document is stored as one JSON file. Route geometry is stripped on
//! write and all segments are dropped on load, since they are re-fetched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::TripStore;
use super::types::TripDocument;

/// Reads and writes the trip document at a fixed path
#[derive(Debug, Clone)]
pub struct TripPersistence {
    path: PathBuf,
}

impl TripPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize a document for storage, without segment geometry
    pub fn encode(doc: &TripDocument) -> Result<String> {
        let stored = TripDocument {
            route_segments: doc.route_segments.iter().map(|s| s.without_geometry()).collect(),
            ..doc.clone()
        };
        serde_json::to_string(&stored).context("Failed to serialize trip")
    }

    /// Parse stored JSON, discarding anything without `metadata` and an array of `stops`
    pub fn decode(raw: &str) -> Option<TripDocument> {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Stored trip is not valid JSON, discarding");
                return None;
            }
        };

        if !value.get("metadata").is_some_and(|m| m.is_object()) || !value.get("stops").is_some_and(|s| s.is_array()) {
            warn!("Stored trip is missing metadata or stops, discarding");
            return None;
        }

        match serde_json::from_value::<TripDocument>(value) {
            Ok(mut doc) => {
                doc.route_segments.clear();
                Some(doc)
            }
            Err(e) => {
                warn!(error = %e, "Stored trip does not match the document shape, discarding");
                None
            }
        }
    }

    /// Load the stored document, if present and valid
    pub fn load(&self) -> Option<TripDocument> {
        debug!(path = %self.path.display(), "load: called");
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, "load: nothing stored");
                return None;
            }
        };
        Self::decode(&raw)
    }

    /// Document to hydrate a session with: only trips that have stops
    pub fn load_for_hydration(&self) -> Option<TripDocument> {
        self.load().filter(|doc| !doc.stops.is_empty())
    }

    pub fn save(&self, doc: &TripDocument) -> Result<()> {
        debug!(path = %self.path.display(), stops = doc.stops.len(), "save: called");
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context("Failed to create trip state directory")?;
        }
        let encoded = Self::encode(doc)?;
        std::fs::write(&self.path, encoded).context(format!("Failed to write {}", self.path.display()))
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context(format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Persist the store's document `debounce` after the last change
///
/// Runs until the store's snapshot channel closes, then flushes once more.
pub fn spawn_autosave(store: &TripStore, persistence: TripPersistence, debounce: Duration) -> JoinHandle<()> {
    let mut rx = store.subscribe();
    tokio::spawn(async move {
        debug!(?debounce, "autosave: started");
        let mut dirty = false;
        loop {
            if dirty {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(debounce) => {
                        let doc = rx.borrow().document.clone();
                        if let Err(e) = persistence.save(&doc) {
                            warn!(error = %e, "autosave: failed to persist trip");
                        }
                        dirty = false;
                    }
                }
            } else {
                if rx.changed().await.is_err() {
                    break;
                }
                dirty = true;
            }
        }

        if dirty {
            let doc = rx.borrow().document.clone();
            if let Err(e) = persistence.save(&doc) {
                warn!(error = %e, "autosave: final flush failed");
            }
        }
        info!("autosave: stopped");
    })
}
