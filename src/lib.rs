//! # pcap-relay
//!
//! Live packet-capture relay: connects to remote per-node capture agents,
//! records each stream to its own pcap trace file, and re-broadcasts the
//! aggregate live stream to any number of attached viewers (e.g. a packet
//! analysis tool reading pcap over TCP).
//!
//! # Architecture
//!
//! ```text
//!  agent ──TCP──► SourceReader ──┬──► TraceWriter (per-source .pcap)
//!  agent ──TCP──► SourceReader ──┼──► mpsc (bounded, drop-on-full)
//!                                │           │
//!                 CaptureRegistry◄┘          ▼
//!                        │            RelayBroadcaster ──► viewer
//!                        ▼                              ──► viewer
//!                   StatsServer (polled JSON snapshot)
//! ```
//!
//! Producers never wait on consumers: a full relay channel drops the newest
//! frame, and a viewer whose write fails is evicted without disturbing the
//! others. Failures are contained per source and per viewer; only a listener
//! bind failure is fatal.
//!
//! # Example
//!
//! ```no_run
//! use pcap_relay::{CaptureSession, RelayConfig, SourceInfo};
//!
//! #[tokio::main]
//! async fn main() -> pcap_relay::Result<()> {
//!     let config = RelayConfig::with_addr("0.0.0.0:4040".parse().unwrap());
//!     let mut session = CaptureSession::start(config).await?;
//!
//!     session
//!         .add_source(
//!             "10.0.0.5:7000",
//!             SourceInfo::new("web", "default", "captures/web.pcap"),
//!         )
//!         .await?;
//!
//!     session
//!         .run_until(async {
//!             tokio::signal::ctrl_c().await.ok();
//!         })
//!         .await;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod error;
pub mod monitor;
pub mod pcap;
pub mod registry;
pub mod relay;
pub mod session;
pub mod source;

pub use codec::Frame;
pub use error::{Error, Result};
pub use monitor::StatsServer;
pub use pcap::TraceWriter;
pub use registry::{CaptureRegistry, SourceSnapshot};
pub use relay::{RelayBroadcaster, RelayConfig};
pub use session::CaptureSession;
pub use source::{SourceInfo, SourceReader, SourceStats};
