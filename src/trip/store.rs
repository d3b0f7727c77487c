//! TripStore - actor that owns the trip document
//!
//! All mutations go through a single task that runs the reducer, so the
//! document is never written concurrently. Readers get cheap snapshots from a
//! watch channel that is updated before each dispatch is acknowledged.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use super::action::TripAction;
use super::ids::{IdGenerator, UuidIds};
use super::reducer::apply;
use super::types::{RouteSegment, TripDocument};

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Trip store is not running")]
    ChannelError,
}

/// Published view of the document
#[derive(Debug, Clone, Default)]
pub struct TripSnapshot {
    pub document: TripDocument,
    /// Bumped on every applied action
    pub revision: u64,
    /// Bumped whenever stop membership or order changes
    pub topology: u64,
}

/// Commands sent to the store actor
#[derive(Debug)]
enum StoreCommand {
    Dispatch {
        actions: Vec<TripAction>,
        reply: oneshot::Sender<()>,
    },
    CommitSegments {
        topology: u64,
        segments: Vec<RouteSegment>,
        reply: oneshot::Sender<bool>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to the trip store actor
#[derive(Clone)]
pub struct TripStore {
    tx: mpsc::Sender<StoreCommand>,
    snapshot_rx: watch::Receiver<Arc<TripSnapshot>>,
    ids: Arc<dyn IdGenerator>,
}

impl TripStore {
    /// Spawn a store with an empty document and UUID stop ids
    pub fn spawn() -> Self {
        Self::spawn_with(TripDocument::default(), Arc::new(UuidIds))
    }

    /// Spawn a store with an initial document and id generator
    pub fn spawn_with(initial: TripDocument, ids: Arc<dyn IdGenerator>) -> Self {
        debug!(stops = initial.stops.len(), "TripStore::spawn_with: called");
        let (tx, rx) = mpsc::channel(256);
        let snapshot = Arc::new(TripSnapshot {
            document: initial,
            revision: 0,
            topology: 0,
        });
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot);

        tokio::spawn(actor_loop(rx, snapshot_tx, ids.clone()));
        info!("TripStore spawned");

        Self { tx, snapshot_rx, ids }
    }

    /// Id generator shared with the reducer, for interpreting tool calls
    pub fn ids(&self) -> Arc<dyn IdGenerator> {
        self.ids.clone()
    }

    /// Current snapshot of the document
    pub fn snapshot(&self) -> Arc<TripSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Current document (cloned out of the snapshot)
    pub fn document(&self) -> TripDocument {
        self.snapshot().document.clone()
    }

    /// Subscribe to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<Arc<TripSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Apply one action
    pub async fn dispatch(&self, action: TripAction) -> Result<(), StoreError> {
        self.dispatch_all(vec![action]).await
    }

    /// Apply actions in order as one batch
    pub async fn dispatch_all(&self, actions: Vec<TripAction>) -> Result<(), StoreError> {
        debug!(count = actions.len(), "dispatch_all: called");
        if actions.is_empty() {
            return Ok(());
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::Dispatch {
                actions,
                reply: reply_tx,
            })
            .await
            .map_err(|_| StoreError::ChannelError)?;
        reply_rx.await.map_err(|_| StoreError::ChannelError)
    }

    /// Replace route segments if the topology is still `topology`
    ///
    /// Returns false when the stop list changed since the batch started.
    pub async fn commit_segments(&self, topology: u64, segments: Vec<RouteSegment>) -> Result<bool, StoreError> {
        debug!(%topology, count = segments.len(), "commit_segments: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::CommitSegments {
                topology,
                segments,
                reply: reply_tx,
            })
            .await
            .map_err(|_| StoreError::ChannelError)?;
        reply_rx.await.map_err(|_| StoreError::ChannelError)
    }

    /// Stop the actor
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("shutdown: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| StoreError::ChannelError)?;
        reply_rx.await.map_err(|_| StoreError::ChannelError)
    }
}

async fn actor_loop(
    mut rx: mpsc::Receiver<StoreCommand>,
    snapshot_tx: watch::Sender<Arc<TripSnapshot>>,
    ids: Arc<dyn IdGenerator>,
) {
    debug!("TripStore actor started");
    let mut state = (*snapshot_tx.borrow().clone()).clone();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::Dispatch { actions, reply } => {
                for action in actions {
                    debug!(action = action.kind(), "actor_loop: Dispatch");
                    if action.changes_topology() {
                        state.topology += 1;
                    }
                    state.revision += 1;
                    state.document = apply(std::mem::take(&mut state.document), action, ids.as_ref());
                }
                snapshot_tx.send_replace(Arc::new(state.clone()));
                let _ = reply.send(());
            }
            StoreCommand::CommitSegments {
                topology,
                segments,
                reply,
            } => {
                if topology != state.topology {
                    debug!(
                        batch = topology,
                        current = state.topology,
                        "actor_loop: CommitSegments rejected stale batch"
                    );
                    let _ = reply.send(false);
                    continue;
                }
                state.revision += 1;
                state.document = apply(
                    std::mem::take(&mut state.document),
                    TripAction::SetRouteSegments(segments),
                    ids.as_ref(),
                );
                snapshot_tx.send_replace(Arc::new(state.clone()));
                let _ = reply.send(true);
            }
            StoreCommand::Shutdown { reply } => {
                info!("TripStore shutting down");
                let _ = reply.send(());
                break;
            }
        }
    }

    debug!("TripStore actor stopped");
}
