//! Capture registry
//!
//! The in-process table of active sources and their counters. Reader tasks
//! register themselves and mark themselves inactive on exit; the monitoring
//! endpoint reads it through `snapshot()`. Stats are read atomically and may
//! be slightly stale: this is a monitoring facility, not a ledger.

pub mod entry;
pub mod store;

pub use entry::{SourceEntry, SourceSnapshot};
pub use store::CaptureRegistry;
