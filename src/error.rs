//! Crate-wide error types
//!
//! Failures local to one source or one viewer connection are contained by the
//! component that observed them; the variants here are what crosses an API
//! boundary. Only a listener bind failure is fatal to the relay as a whole.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for relay operations
#[derive(Debug, Error)]
pub enum Error {
    /// Could not reach a remote capture agent. Fatal to that source only.
    #[error("failed to connect to capture agent at {addr}")]
    Connect {
        /// Agent address we tried to reach
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Could not bind a listening socket. Fatal to the relay.
    #[error("failed to bind listener on {addr}")]
    Bind {
        /// Requested bind address
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Trace file I/O failed. Disables that source's writer only.
    #[error("trace file {path}: {source}")]
    Trace {
        /// Path of the trace file
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A write was attempted on an already-closed trace writer
    #[error("trace file {path} is already closed")]
    TraceClosed {
        /// Path of the trace file
        path: PathBuf,
    },

    /// A source with the same name is already registered
    #[error("source {0} is already registered")]
    DuplicateSource(String),

    /// The identification handshake could not be serialized
    #[error("handshake encoding failed")]
    Handshake(#[from] serde_json::Error),

    /// Other I/O error
    #[error(transparent)]
    Io(#[from] io::Error),
}
