//! Capture sources
//!
//! A source is one remote capture agent stream. Its reader task owns the TCP
//! connection, reassembles frames from the byte stream, records them to the
//! source's trace file, and forwards copies onto the shared relay channel.

pub mod info;
pub mod reader;
pub mod stats;

pub use info::SourceInfo;
pub use reader::SourceReader;
pub use stats::SourceStats;
