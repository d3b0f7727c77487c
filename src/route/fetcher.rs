//! RouteFetcher - keeps route segments in step with the stop list
//!
//! Watches the trip store. Whenever the stop topology changes (which clears
//! the segments), it waits for the changes to settle, looks up every
//! consecutive pair not already cached and commits the ordered batch. A batch
//! is tied to the topology generation it started from; if the stops change
//! while it runs, it is abandoned and the store rejects it anyway.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::SegmentCache;
use super::directions::{MapboxDirections, PathLookup};
use crate::config::RouteConfig;
use crate::trip::{RouteSegment, StoreError, TripSnapshot, TripStore};

#[derive(Debug, Clone, Copy)]
pub struct FetcherOptions {
    /// Quiet period before a batch starts; restarted by further changes
    pub debounce: Duration,
    /// Pause between consecutive lookups
    pub request_delay: Duration,
}

impl FetcherOptions {
    pub fn from_config(config: &RouteConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            request_delay: Duration::from_millis(100),
        }
    }
}

/// How a batch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchResult {
    Committed,
    Stale,
    Shutdown,
}

pub struct RouteFetcher {
    store: TripStore,
    lookup: Arc<dyn PathLookup>,
    cache: SegmentCache,
    options: FetcherOptions,
}

impl RouteFetcher {
    pub fn new(store: TripStore, lookup: Arc<dyn PathLookup>, options: FetcherOptions) -> Self {
        Self {
            store,
            lookup,
            cache: SegmentCache::new(),
            options,
        }
    }

    /// Run until `shutdown` fires or the store goes away
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(mut self, shutdown: CancellationToken) {
        info!("RouteFetcher started");
        let mut rx = self.store.subscribe();

        loop {
            let snapshot = rx.borrow_and_update().clone();

            if !needs_segments(&snapshot) {
                tokio::select! {
                    changed = rx.changed() => if changed.is_err() { break },
                    _ = shutdown.cancelled() => break,
                }
                continue;
            }

            debug!(topology = snapshot.topology, "run: stops changed, debouncing");
            tokio::select! {
                _ = tokio::time::sleep(self.options.debounce) => {}
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = shutdown.cancelled() => break,
            }

            let snapshot = self.store.snapshot();
            if !needs_segments(&snapshot) {
                continue;
            }
            match self.fetch_batch(&snapshot, &mut rx, &shutdown).await {
                Ok(BatchResult::Shutdown) => break,
                Ok(result) => debug!(?result, "run: batch finished"),
                Err(e) => {
                    warn!(error = %e, "run: store unavailable");
                    break;
                }
            }
        }

        info!("RouteFetcher stopped");
    }

    async fn fetch_batch(
        &mut self,
        snapshot: &TripSnapshot,
        rx: &mut watch::Receiver<Arc<TripSnapshot>>,
        shutdown: &CancellationToken,
    ) -> Result<BatchResult, StoreError> {
        let topology = snapshot.topology;
        let stops = &snapshot.document.stops;
        let missing = self.cache.missing(stops);
        info!(
            %topology,
            pairs = stops.len().saturating_sub(1),
            to_fetch = missing.len(),
            "fetch_batch: called"
        );

        for (i, (from, to)) in missing.into_iter().enumerate() {
            if i > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(self.options.request_delay) => {}
                    _ = topology_changed(rx, topology) => return Ok(BatchResult::Stale),
                    _ = shutdown.cancelled() => return Ok(BatchResult::Shutdown),
                }
            }
            if self.store.snapshot().topology != topology {
                return Ok(BatchResult::Stale);
            }

            let segment = tokio::select! {
                result = self.lookup.lookup(from, to) => match result {
                    Ok(segment) => segment,
                    Err(e) => {
                        warn!(from = %from.name, to = %to.name, error = %e, "fetch_batch: lookup failed, using straight line");
                        RouteSegment::straight_fallback(from, to)
                    }
                },
                _ = topology_changed(rx, topology) => {
                    debug!("fetch_batch: stops changed during lookup");
                    return Ok(BatchResult::Stale);
                }
                _ = shutdown.cancelled() => return Ok(BatchResult::Shutdown),
            };
            self.cache.insert(segment);
        }

        let segments = self.cache.assemble(stops);
        if self.store.commit_segments(topology, segments).await? {
            info!(%topology, "fetch_batch: segments committed");
            Ok(BatchResult::Committed)
        } else {
            debug!(%topology, "fetch_batch: commit rejected as stale");
            Ok(BatchResult::Stale)
        }
    }
}

/// Segments are missing and there is something to connect
fn needs_segments(snapshot: &TripSnapshot) -> bool {
    snapshot.document.route_segments.is_empty() && snapshot.document.stops.len() >= 2
}

/// Resolves once the store's topology differs from `topology`
async fn topology_changed(rx: &mut watch::Receiver<Arc<TripSnapshot>>, topology: u64) {
    loop {
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        if rx.borrow().topology != topology {
            return;
        }
    }
}

/// Start a fetcher backed by the Mapbox Directions API
///
/// Returns None when routing is disabled or no token is configured.
pub fn spawn_route_fetcher(store: &TripStore, config: &RouteConfig, shutdown: CancellationToken) -> Option<JoinHandle<()>> {
    if !config.enabled {
        info!("Route fetching disabled in config");
        return None;
    }
    let directions = match MapboxDirections::from_config(config) {
        Ok(directions) => directions,
        Err(e) => {
            warn!(error = %e, "Route fetching disabled");
            return None;
        }
    };
    let fetcher = RouteFetcher::new(store.clone(), Arc::new(directions), FetcherOptions::from_config(config));
    Some(fetcher.spawn(shutdown))
}
