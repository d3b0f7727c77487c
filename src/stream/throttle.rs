//! Frame-style commit coalescing
//!
//! Text deltas arrive far faster than anyone can read them. A commit request
//! arms a deadline one frame period out; further requests before it fires
//! are folded into the same commit.

use std::time::Duration;

use tokio::time::Instant;

/// Default frame period
pub const DEFAULT_COMMIT_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone)]
pub struct CommitThrottle {
    interval: Duration,
    deadline: Option<Instant>,
}

impl CommitThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Ask for a commit; no-op when one is already scheduled
    pub fn request(&mut self) {
        if self.deadline.is_none() {
            self.deadline = Some(Instant::now() + self.interval);
        }
    }

    /// When the pending commit is due
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm; returns whether a commit was pending
    pub fn take(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

impl Default for CommitThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_INTERVAL)
    }
}

/// Sleep until `deadline`, or forever when there is none
pub async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
