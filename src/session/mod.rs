//! Capture session orchestration
//!
//! Ties the pieces together: the registry, the shared bounded channel, the
//! broadcaster, and one reader task per source, all keyed off a single
//! cancellation token. `shutdown()` cancels every task, lets frames already
//! buffered flush best-effort, and joins the tasks before returning.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::codec::Frame;
use crate::error::Result;
use crate::monitor::StatsServer;
use crate::pcap::TraceWriter;
use crate::registry::CaptureRegistry;
use crate::relay::{RelayBroadcaster, RelayConfig};
use crate::source::{SourceInfo, SourceReader, SourceStats};

/// A running capture session
///
/// # Example
/// ```no_run
/// use pcap_relay::{CaptureSession, RelayConfig, SourceInfo};
///
/// # async fn example() -> pcap_relay::Result<()> {
/// let mut session = CaptureSession::start(RelayConfig::default()).await?;
/// session
///     .add_source(
///         "10.0.0.5:7000",
///         SourceInfo::new("web", "default", "captures/web.pcap"),
///     )
///     .await?;
///
/// tokio::signal::ctrl_c().await.ok();
/// session.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct CaptureSession {
    config: RelayConfig,
    registry: Arc<CaptureRegistry>,
    relay_tx: mpsc::Sender<Frame>,
    relay_addr: SocketAddr,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl CaptureSession {
    /// Bind the relay listener and start the broadcaster task
    ///
    /// A bind failure here is fatal to the session; everything after this
    /// point degrades per source or per viewer instead.
    pub async fn start(config: RelayConfig) -> Result<Self> {
        let registry = Arc::new(CaptureRegistry::new());
        let (relay_tx, relay_rx) = mpsc::channel(config.channel_capacity);

        let broadcaster = RelayBroadcaster::bind(config.clone()).await?;
        let relay_addr = broadcaster.local_addr()?;

        let shutdown = CancellationToken::new();
        let tasks = vec![tokio::spawn(
            broadcaster.run(relay_rx, shutdown.child_token()),
        )];

        Ok(Self {
            config,
            registry,
            relay_tx,
            relay_addr,
            shutdown,
            tasks,
        })
    }

    /// Connect to a capture agent and start recording and relaying it
    ///
    /// Opens the trace file first: if the file cannot be created there is
    /// nothing durable to record to and the source is not started.
    pub async fn add_source(&mut self, agent_addr: &str, info: SourceInfo) -> Result<()> {
        let stream = SourceReader::connect(agent_addr, &info).await?;
        let writer = TraceWriter::create(&info.trace_path, self.config.snaplen).await?;

        let stats = Arc::new(SourceStats::new());
        self.registry
            .register(info.clone(), Arc::clone(&stats))
            .await?;

        let reader = SourceReader::new(
            info,
            stats,
            Arc::clone(&self.registry),
            self.relay_tx.clone(),
        );
        self.tasks.push(tokio::spawn(reader.run(
            stream,
            Some(writer),
            self.shutdown.child_token(),
        )));
        Ok(())
    }

    /// Start the polled monitoring endpoint; returns its bound address
    pub async fn serve_stats(&mut self, addr: SocketAddr) -> Result<SocketAddr> {
        let server = StatsServer::bind(addr, Arc::clone(&self.registry)).await?;
        let bound = server.local_addr()?;
        self.tasks
            .push(tokio::spawn(server.run(self.shutdown.child_token())));
        Ok(bound)
    }

    /// Address viewers connect to
    pub fn relay_addr(&self) -> SocketAddr {
        self.relay_addr
    }

    /// The session's source registry
    pub fn registry(&self) -> &Arc<CaptureRegistry> {
        &self.registry
    }

    /// Stop every task, flush what is already buffered, and join
    ///
    /// Best-effort drain: frames decoded before cancellation reach open trace
    /// files and connected viewers; nothing new is accepted afterwards.
    pub async fn shutdown(mut self) {
        tracing::info!("Shutting down capture session");
        self.shutdown.cancel();
        // Closing our sender lets the broadcaster observe end-of-stream once
        // the reader tasks have dropped theirs.
        drop(self.relay_tx);

        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Session task panicked");
            }
        }
    }

    /// Run until the given future resolves, then shut down
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: std::future::Future<Output = ()>,
    {
        shutdown.await;
        tracing::info!("Shutdown signal received");
        self.shutdown().await;
    }
}
