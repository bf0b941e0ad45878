//! Agent frame codec
//!
//! Capture agents stream frames over TCP as a fixed 16-byte little-endian
//! header followed by a variable-length payload:
//!
//! ```text
//! offset  size  field
//! 0       4     timestamp seconds
//! 4       4     timestamp microseconds (x1000 for the nanosecond component)
//! 8       4     captured length (payload bytes on the wire)
//! 12      4     original length (packet size before truncation)
//! 16      n     payload (n = captured length)
//! ```
//!
//! The same layout doubles as the pcap record header, so a decoded frame can
//! be re-emitted to a trace sink without transformation.

pub mod frame;

pub use frame::{decode_next, encode, Frame, HEADER_LEN};
