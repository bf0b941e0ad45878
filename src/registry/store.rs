//! Registry storage
//!
//! `RwLock<BTreeMap>` keyed by source name: registration and teardown are
//! rare, snapshots are the common read path and never block each other. The
//! BTreeMap keeps snapshots in stable name order.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::source::{SourceInfo, SourceStats};

use super::entry::{SourceEntry, SourceSnapshot};

/// Table of all capture sources known to this relay
#[derive(Debug, Default)]
pub struct CaptureRegistry {
    sources: RwLock<BTreeMap<String, SourceEntry>>,
}

impl CaptureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source and the counters its reader task will update
    ///
    /// Source names are unique; registering a name twice is an error.
    pub async fn register(&self, info: SourceInfo, stats: Arc<SourceStats>) -> Result<()> {
        let mut sources = self.sources.write().await;

        if sources.contains_key(&info.name) {
            return Err(Error::DuplicateSource(info.name.clone()));
        }

        tracing::info!(source = %info, trace = %info.trace_path.display(), "Source registered");
        sources.insert(info.name.clone(), SourceEntry::new(info, stats));
        Ok(())
    }

    /// Remove a source from the registry entirely
    pub async fn unregister(&self, name: &str) {
        let mut sources = self.sources.write().await;
        if sources.remove(name).is_some() {
            tracing::info!(source = name, "Source unregistered");
        }
    }

    /// Mark a source's reader as terminated, keeping its final counters visible
    pub async fn mark_inactive(&self, name: &str) {
        let mut sources = self.sources.write().await;
        if let Some(entry) = sources.get_mut(name) {
            entry.active = false;
            tracing::info!(
                source = name,
                frames = entry.stats.frames(),
                bytes = entry.stats.bytes(),
                "Source inactive"
            );
        }
    }

    /// Whether a source's reader is currently running
    pub async fn is_active(&self, name: &str) -> bool {
        let sources = self.sources.read().await;
        sources.get(name).map(|e| e.active).unwrap_or(false)
    }

    /// Point-in-time view of all sources, ordered by name
    ///
    /// Counters are read atomically but may trail the reader tasks slightly.
    pub async fn snapshot(&self) -> Vec<SourceSnapshot> {
        let sources = self.sources.read().await;
        sources.values().map(SourceEntry::snapshot).collect()
    }

    /// Number of registered sources
    pub async fn len(&self) -> usize {
        self.sources.read().await.len()
    }

    /// Whether the registry holds no sources
    pub async fn is_empty(&self) -> bool {
        self.sources.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::codec::Frame;

    fn info(name: &str) -> SourceInfo {
        SourceInfo::new(name, "default", format!("/tmp/{name}.pcap"))
    }

    #[tokio::test]
    async fn test_register_and_snapshot() {
        let registry = CaptureRegistry::new();
        let stats = Arc::new(SourceStats::new());

        registry.register(info("web"), Arc::clone(&stats)).await.unwrap();
        stats.record(&Frame::new(1, 2, 4, Bytes::from_static(b"DEAD")));

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "web");
        assert_eq!(snapshot[0].namespace, "default");
        assert_eq!(snapshot[0].frames, 1);
        assert_eq!(snapshot[0].bytes, 4);
        assert!(snapshot[0].active);
        // Freshly registered; the clock has barely moved
        assert!(snapshot[0].uptime_secs < 5);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let registry = CaptureRegistry::new();
        registry
            .register(info("web"), Arc::new(SourceStats::new()))
            .await
            .unwrap();

        let result = registry
            .register(info("web"), Arc::new(SourceStats::new()))
            .await;
        assert!(matches!(result, Err(Error::DuplicateSource(name)) if name == "web"));
    }

    #[tokio::test]
    async fn test_snapshot_is_name_ordered() {
        let registry = CaptureRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(info(name), Arc::new(SourceStats::new()))
                .await
                .unwrap();
        }

        let names: Vec<_> = registry
            .snapshot()
            .await
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn test_mark_inactive_keeps_counters() {
        let registry = CaptureRegistry::new();
        let stats = Arc::new(SourceStats::new());
        registry.register(info("web"), Arc::clone(&stats)).await.unwrap();
        stats.record(&Frame::new(1, 2, 4, Bytes::from_static(b"DEAD")));

        registry.mark_inactive("web").await;

        assert!(!registry.is_active("web").await);
        let snapshot = registry.snapshot().await;
        assert!(!snapshot[0].active);
        assert_eq!(snapshot[0].frames, 1);
    }

    #[tokio::test]
    async fn test_unregister() {
        let registry = CaptureRegistry::new();
        registry
            .register(info("web"), Arc::new(SourceStats::new()))
            .await
            .unwrap();
        assert_eq!(registry.len().await, 1);

        registry.unregister("web").await;
        assert!(registry.is_empty().await);
        assert!(!registry.is_active("web").await);
    }
}
