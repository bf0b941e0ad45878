//! Live relay broadcaster
//!
//! Fan-out side of the relay: one listening socket, any number of viewer
//! connections, every frame from the shared channel written to all of them.
//!
//! ```text
//!  [SourceReader] ─┐
//!  [SourceReader] ─┼──► mpsc (bounded) ──► RelayBroadcaster ─┬──► viewer
//!  [SourceReader] ─┘      fan-in              owner task     ├──► viewer
//!                                                            └──► viewer
//! ```
//!
//! The viewer set is owned by the broadcaster task alone; accepts and
//! evictions happen on the same task, so the set needs no locking. A viewer
//! whose write fails or times out is evicted immediately and the remaining
//! viewers keep receiving.

pub mod broadcaster;
pub mod config;

pub use broadcaster::RelayBroadcaster;
pub use config::RelayConfig;
