//! Registry entry and snapshot types

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::source::{SourceInfo, SourceStats};

/// Per-source state held by the registry
#[derive(Debug)]
pub struct SourceEntry {
    /// Source identity
    pub info: SourceInfo,

    /// Counters shared with the source's reader task
    pub stats: Arc<SourceStats>,

    /// Whether the reader task is still running
    pub active: bool,

    /// When the source was registered
    pub registered_at: Instant,
}

impl SourceEntry {
    pub(super) fn new(info: SourceInfo, stats: Arc<SourceStats>) -> Self {
        Self {
            info,
            stats,
            active: true,
            registered_at: Instant::now(),
        }
    }

    /// Point-in-time view of this entry
    pub fn snapshot(&self) -> SourceSnapshot {
        SourceSnapshot {
            name: self.info.name.clone(),
            namespace: self.info.namespace.clone(),
            trace_path: self.info.trace_path.display().to_string(),
            active: self.active,
            frames: self.stats.frames(),
            bytes: self.stats.bytes(),
            uptime_secs: self.registered_at.elapsed().as_secs(),
        }
    }
}

/// Serializable point-in-time view of one source, as exposed to monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    /// Source name
    pub name: String,
    /// Source namespace
    pub namespace: String,
    /// Trace file destination
    pub trace_path: String,
    /// Whether the reader task is still running
    pub active: bool,
    /// Frames decoded so far
    pub frames: u64,
    /// Payload bytes decoded so far
    pub bytes: u64,
    /// Seconds since the source was registered
    pub uptime_secs: u64,
}
