//! Stop id generation
//!
//! Ids are the only stable cross-reference between stops, route segments and
//! UI selection, so generation is injectable: production uses UUIDv7, tests use
//! a deterministic sequence.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of fresh stop ids
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Time-ordered UUIDv7 ids
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::now_v7().to_string()
    }
}

/// Deterministic `stop-1`, `stop-2`, ... ids
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("stop-{}", n)
    }
}
