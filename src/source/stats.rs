//! Per-source counters
//!
//! Written only by the owning reader task, read lock-free by the registry
//! snapshot. Relaxed ordering is enough: readers tolerate slightly stale
//! values, each load is atomic-sized.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::codec::Frame;

/// Monotonically increasing counters for one source
#[derive(Debug, Default)]
pub struct SourceStats {
    frames: AtomicU64,
    bytes: AtomicU64,
}

impl SourceStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one decoded frame
    pub fn record(&self, frame: &Frame) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.bytes
            .fetch_add(frame.payload.len() as u64, Ordering::Relaxed);
    }

    /// Frames decoded so far
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Payload bytes decoded so far
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}
