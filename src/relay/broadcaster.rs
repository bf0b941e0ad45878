//! Broadcaster task
//!
//! A single task owns both duties: accepting viewer connections and fanning
//! frames out to them. Running both on one task keeps the viewer set
//! single-writer and lock-free. Writes carry a deadline so a wedged peer
//! degrades into an eviction instead of stalling delivery forever.

use std::net::SocketAddr;

use bytes::BytesMut;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::codec::{self, Frame};
use crate::error::{Error, Result};
use crate::pcap::{self, TraceWriter};

use super::config::RelayConfig;

/// One downstream viewer connection
///
/// Ephemeral: created on accept, destroyed on the first failed write. The id
/// reflects accept order and exists only for log context.
struct Viewer {
    id: u64,
    peer_addr: SocketAddr,
    stream: TcpStream,
}

/// Broadcasts the aggregate capture stream to all connected viewers
pub struct RelayBroadcaster {
    listener: TcpListener,
    config: RelayConfig,
    viewers: Vec<Viewer>,
    next_viewer_id: u64,
    merged: Option<TraceWriter>,
}

impl RelayBroadcaster {
    /// Bind the viewer listener and open the merged trace file, if configured
    ///
    /// A bind failure is fatal to the relay and surfaced to the caller, as is
    /// a failure to create the merged trace file.
    pub async fn bind(config: RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|e| Error::Bind {
                addr: config.bind_addr,
                source: e,
            })?;

        tracing::info!(addr = %listener.local_addr()?, "Relay listening for viewers");

        let merged = match &config.merged_trace_path {
            Some(path) => Some(TraceWriter::create(path, config.snaplen).await?),
            None => None,
        };

        Ok(Self {
            listener,
            config,
            viewers: Vec::new(),
            next_viewer_id: 1,
            merged,
        })
    }

    /// Actual bound address (useful when binding to port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run until the token fires, then drain and close all viewers
    ///
    /// Frames still buffered in the channel at cancellation are delivered
    /// best-effort before the sockets are shut down.
    pub async fn run(mut self, mut frames: mpsc::Receiver<Frame>, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!(viewers = self.viewers.len(), "Relay shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((socket, peer_addr)) => self.add_viewer(socket, peer_addr).await,
                    Err(e) => tracing::error!(error = %e, "Failed to accept viewer"),
                },
                frame = frames.recv() => match frame {
                    Some(frame) => self.broadcast(&frame).await,
                    None => {
                        tracing::info!("All sources gone, relay stopping");
                        break;
                    }
                },
            }
        }

        // Best-effort drain of frames that were already queued
        while let Ok(frame) = frames.try_recv() {
            self.broadcast(&frame).await;
        }

        for viewer in &mut self.viewers {
            let _ = viewer.stream.shutdown().await;
        }

        if let Some(mut merged) = self.merged.take() {
            if let Err(e) = merged.close().await {
                tracing::warn!(error = %e, "Merged trace close failed");
            }
        }
    }

    /// Register a freshly accepted viewer
    ///
    /// The pcap global header goes out immediately so a viewer attaching
    /// mid-stream still receives a valid capture container.
    async fn add_viewer(&mut self, socket: TcpStream, peer_addr: SocketAddr) {
        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::debug!(peer = %peer_addr, error = %e, "Failed to set TCP_NODELAY");
            }
        }

        let id = self.next_viewer_id;
        self.next_viewer_id += 1;

        let mut viewer = Viewer {
            id,
            peer_addr,
            stream: socket,
        };

        let header = pcap::file_header(self.config.snaplen);
        match timeout(
            self.config.viewer_write_timeout,
            viewer.stream.write_all(&header),
        )
        .await
        {
            Ok(Ok(())) => {
                tracing::info!(viewer = id, peer = %peer_addr, "Viewer connected");
                self.viewers.push(viewer);
            }
            Ok(Err(e)) => {
                tracing::warn!(viewer = id, peer = %peer_addr, error = %e, "Viewer rejected at header write");
            }
            Err(_) => {
                tracing::warn!(viewer = id, peer = %peer_addr, "Viewer header write timed out");
            }
        }
    }

    /// Record one frame to the merged trace and write it to every viewer,
    /// evicting any viewer whose write fails
    async fn broadcast(&mut self, frame: &Frame) {
        self.write_merged(frame).await;

        if self.viewers.is_empty() {
            return;
        }

        // Encode once; every viewer receives the same record bytes
        let mut record = BytesMut::with_capacity(frame.encoded_len());
        codec::encode(frame, &mut record);

        let mut dead = Vec::new();
        for viewer in &mut self.viewers {
            match timeout(
                self.config.viewer_write_timeout,
                viewer.stream.write_all(&record),
            )
            .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::info!(
                        viewer = viewer.id,
                        peer = %viewer.peer_addr,
                        error = %e,
                        "Viewer write failed, evicting"
                    );
                    dead.push(viewer.id);
                }
                Err(_) => {
                    tracing::warn!(
                        viewer = viewer.id,
                        peer = %viewer.peer_addr,
                        "Viewer write timed out, evicting"
                    );
                    dead.push(viewer.id);
                }
            }
        }

        if !dead.is_empty() {
            // Dropping the Viewer closes its socket
            self.viewers.retain(|v| !dead.contains(&v.id));
        }
    }

    /// Append a frame to the merged trace, disabling it on the first failure
    ///
    /// Merged trace loss never disturbs delivery to viewers or the
    /// per-source traces.
    async fn write_merged(&mut self, frame: &Frame) {
        let mut failed = false;
        if let Some(merged) = self.merged.as_mut() {
            if let Err(e) = merged.write(frame).await {
                tracing::error!(error = %e, "Merged trace write failed, disabling merged trace");
                failed = true;
            }
        }
        if failed {
            if let Some(mut merged) = self.merged.take() {
                let _ = merged.close().await;
            }
        }
    }
}
