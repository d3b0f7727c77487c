//! Fixed-window request limiter

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Time source for the limiter
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Allows `limit` requests per key in each `window`
///
/// A key's window starts with its first request and resets once it has fully
/// elapsed.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_clock(limit, window, Arc::new(SystemClock))
    }

    pub fn with_clock(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        debug!(%limit, ?window, "RateLimiter::with_clock: called");
        Self {
            limit,
            window,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request for `key`; false when the key is over its limit
    pub fn check(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut windows = self.lock();

        match windows.get_mut(key) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count >= self.limit {
                    warn!(%key, count = entry.count, "RateLimiter::check: limit reached");
                    return false;
                }
                entry.count += 1;
                true
            }
            _ => {
                // A key is starting a fresh window; drop any others that have lapsed
                purge(&mut windows, now);
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    /// Time until `key` may send again (zero when it may send now)
    pub fn retry_after(&self, key: &str) -> Duration {
        let now = self.clock.now();
        match self.lock().get(key) {
            Some(entry) if entry.count >= self.limit && now <= entry.reset_at => entry.reset_at - now,
            _ => Duration::ZERO,
        }
    }

    /// Drop windows that have fully elapsed; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        purge(&mut self.lock(), now)
    }

    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn purge(windows: &mut HashMap<String, Window>, now: Instant) -> usize {
    let before = windows.len();
    windows.retain(|_, w| now <= w.reset_at);
    let removed = before - windows.len();
    if removed > 0 {
        debug!(%removed, "purge: removed expired windows");
    }
    removed
}
