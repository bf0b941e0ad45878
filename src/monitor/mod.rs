//! Monitoring endpoint
//!
//! A polled, read-only facility: each accepted connection receives the
//! JSON-serialized registry snapshot and is closed. Failures are contained
//! per connection; nothing here can disturb capture or relay traffic.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::registry::CaptureRegistry;

/// Deadline for writing a snapshot to a poller; a stalled poller is dropped
/// rather than holding up the accept loop
const POLL_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Serves registry snapshots to polling monitors
pub struct StatsServer {
    listener: TcpListener,
    registry: Arc<CaptureRegistry>,
}

impl StatsServer {
    /// Bind the monitoring listener
    pub async fn bind(addr: SocketAddr, registry: Arc<CaptureRegistry>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Bind { addr, source: e })?;

        tracing::info!(addr = %listener.local_addr()?, "Stats endpoint listening");
        Ok(Self { listener, registry })
    }

    /// Actual bound address (useful when binding to port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve snapshots until the token fires
    pub async fn run(self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Stats endpoint shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((mut socket, peer_addr)) => {
                        let snapshot = self.registry.snapshot().await;
                        let mut body = match serde_json::to_vec_pretty(&snapshot) {
                            Ok(body) => body,
                            Err(e) => {
                                tracing::error!(error = %e, "Snapshot serialization failed");
                                continue;
                            }
                        };
                        body.push(b'\n');

                        match timeout(POLL_WRITE_TIMEOUT, socket.write_all(&body)).await {
                            Ok(Ok(())) => {
                                let _ = timeout(POLL_WRITE_TIMEOUT, socket.shutdown()).await;
                            }
                            Ok(Err(e)) => {
                                tracing::debug!(peer = %peer_addr, error = %e, "Stats write failed");
                            }
                            Err(_) => {
                                tracing::debug!(peer = %peer_addr, "Stats write timed out");
                            }
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to accept stats poll"),
                },
            }
        }
    }
}
