//! Relay configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::pcap::DEFAULT_SNAPLEN;

/// Capacity of the shared source-to-broadcaster channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Relay configuration options
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the viewer listener binds to (port 0 picks an ephemeral port)
    pub bind_addr: SocketAddr,

    /// Capacity of the shared fan-in channel; a full channel drops frames
    pub channel_capacity: usize,

    /// Deadline for a single write to a viewer before it is evicted
    pub viewer_write_timeout: Duration,

    /// Snapshot length advertised in pcap headers
    pub snaplen: u32,

    /// Enable TCP_NODELAY on viewer connections
    pub tcp_nodelay: bool,

    /// Optional path of a merged trace file recording the aggregate stream
    ///
    /// When set, every frame that reaches the broadcaster is also appended
    /// to this one file, alongside the per-source traces.
    pub merged_trace_path: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:0".parse().unwrap(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            viewer_write_timeout: Duration::from_secs(5),
            snaplen: DEFAULT_SNAPLEN,
            tcp_nodelay: true, // Viewers are live consumers, latency matters
            merged_trace_path: None,
        }
    }
}

impl RelayConfig {
    /// Create a config with a custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the fan-in channel capacity
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Set the per-viewer write deadline
    pub fn viewer_write_timeout(mut self, timeout: Duration) -> Self {
        self.viewer_write_timeout = timeout;
        self
    }

    /// Set the advertised snapshot length
    pub fn snaplen(mut self, snaplen: u32) -> Self {
        self.snaplen = snaplen;
        self
    }

    /// Record the aggregate stream to a merged trace file
    pub fn merged_trace(mut self, path: impl Into<PathBuf>) -> Self {
        self.merged_trace_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        assert_eq!(config.bind_addr.port(), 0);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.viewer_write_timeout, Duration::from_secs(5));
        assert_eq!(config.snaplen, DEFAULT_SNAPLEN);
        assert!(config.tcp_nodelay);
        assert!(config.merged_trace_path.is_none());
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let config = RelayConfig::default()
            .bind(addr)
            .channel_capacity(16)
            .viewer_write_timeout(Duration::from_millis(500))
            .snaplen(65535);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.viewer_write_timeout, Duration::from_millis(500));
        assert_eq!(config.snaplen, 65535);
    }

    #[test]
    fn test_merged_trace_builder() {
        let config = RelayConfig::default().merged_trace("/tmp/merged.pcap");
        assert_eq!(
            config.merged_trace_path,
            Some(PathBuf::from("/tmp/merged.pcap"))
        );
    }

    #[test]
    fn test_channel_capacity_floor() {
        // A zero-capacity bounded channel is invalid
        let config = RelayConfig::default().channel_capacity(0);
        assert_eq!(config.channel_capacity, 1);
    }
}
