//! Source reader task
//!
//! One reader per capture agent connection. The loop reads whatever bytes the
//! socket has, drains complete frames out of the accumulation buffer, and for
//! each frame: counts it, appends it to the source's trace file, and offers a
//! copy to the shared relay channel. The offer is non-blocking: a full
//! channel drops the frame so that slow viewers can never throttle the
//! agent-side read throughput.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::codec::{self, Frame};
use crate::error::{Error, Result};
use crate::pcap::TraceWriter;
use crate::registry::CaptureRegistry;

use super::info::SourceInfo;
use super::stats::SourceStats;

/// Initial capacity of the per-source accumulation buffer
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Reader for a single capture agent stream
pub struct SourceReader {
    info: SourceInfo,
    stats: Arc<SourceStats>,
    registry: Arc<CaptureRegistry>,
    relay_tx: mpsc::Sender<Frame>,
}

impl SourceReader {
    /// Create a reader for a registered source
    pub fn new(
        info: SourceInfo,
        stats: Arc<SourceStats>,
        registry: Arc<CaptureRegistry>,
        relay_tx: mpsc::Sender<Frame>,
    ) -> Self {
        Self {
            info,
            stats,
            registry,
            relay_tx,
        }
    }

    /// Connect to a capture agent and send the identification handshake
    ///
    /// The agent uses the handshake record to select which interface to
    /// sample before it starts streaming frames back.
    pub async fn connect(addr: &str, info: &SourceInfo) -> Result<TcpStream> {
        let mut stream = TcpStream::connect(addr).await.map_err(|e| Error::Connect {
            addr: addr.to_string(),
            source: e,
        })?;

        let handshake = info.handshake()?;
        stream.write_all(&handshake).await.map_err(|e| Error::Connect {
            addr: addr.to_string(),
            source: e,
        })?;

        tracing::info!(source = %info, agent = addr, "Connected to capture agent");
        Ok(stream)
    }

    /// Run the read loop until the connection closes or the token fires
    ///
    /// On exit the trace writer is closed and the source is marked inactive
    /// in the registry.
    pub async fn run(
        self,
        mut stream: TcpStream,
        mut writer: Option<TraceWriter>,
        shutdown: CancellationToken,
    ) {
        let mut buf = BytesMut::with_capacity(READ_BUFFER_SIZE);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!(source = %self.info, "Source reader cancelled");
                    break;
                }
                read = stream.read_buf(&mut buf) => match read {
                    Ok(0) => {
                        tracing::info!(source = %self.info, "Agent closed the connection");
                        break;
                    }
                    Ok(_) => {
                        while let Some(frame) = codec::decode_next(&mut buf) {
                            self.handle_frame(frame, &mut writer).await;
                        }
                        // Incomplete trailing bytes stay buffered for the next read
                    }
                    Err(e) => {
                        tracing::warn!(source = %self.info, error = %e, "Agent read failed");
                        break;
                    }
                }
            }
        }

        // Flush any complete frames still sitting in the accumulation buffer
        // before the trace file closes; incomplete leftovers are discarded.
        while let Some(frame) = codec::decode_next(&mut buf) {
            self.handle_frame(frame, &mut writer).await;
        }

        if let Some(mut w) = writer.take() {
            if let Err(e) = w.close().await {
                tracing::warn!(source = %self.info, error = %e, "Trace close failed");
            }
        }
        self.registry.mark_inactive(&self.info.name).await;
    }

    async fn handle_frame(&self, frame: Frame, writer: &mut Option<TraceWriter>) {
        if frame.captured_len() > frame.original_len {
            // Recorded anyway; agents occasionally misreport the original size
            tracing::warn!(
                source = %self.info,
                captured = frame.captured_len(),
                original = frame.original_len,
                "Captured length exceeds original length"
            );
        }

        self.stats.record(&frame);

        let mut trace_failed = false;
        if let Some(w) = writer.as_mut() {
            if let Err(e) = w.write(&frame).await {
                tracing::error!(
                    source = %self.info,
                    error = %e,
                    "Trace write failed, disabling writer for this source"
                );
                trace_failed = true;
            }
        }
        if trace_failed {
            if let Some(mut w) = writer.take() {
                let _ = w.close().await;
            }
        }

        match self.relay_tx.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    source = %self.info,
                    "Relay channel full, dropping frame"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(source = %self.info, "Relay channel closed");
            }
        }
    }
}
