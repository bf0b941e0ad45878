//! Frame type and header parsing
//!
//! `decode_next` works against an accumulating buffer fed by the socket read
//! loop: it either consumes exactly one whole frame or leaves the buffer
//! untouched until more bytes arrive. TCP gives no message boundaries, so a
//! frame may trickle in one byte at a time; decoding must be insensitive to
//! how reads fragment.

use std::time::{Duration, SystemTime};

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the fixed frame header in bytes
pub const HEADER_LEN: usize = 16;

/// One captured network frame plus its capture metadata
///
/// The payload is reference-counted (`Bytes`), so cloning a frame for fan-out
/// shares the allocation rather than copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Capture timestamp, whole seconds since the Unix epoch
    pub ts_sec: u32,

    /// Microsecond component of the capture timestamp
    pub ts_usec: u32,

    /// Size of the packet as it appeared on the wire, before any truncation
    pub original_len: u32,

    /// Captured bytes; its length is the frame's captured length
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame from its header fields and payload
    pub fn new(ts_sec: u32, ts_usec: u32, original_len: u32, payload: Bytes) -> Self {
        Self {
            ts_sec,
            ts_usec,
            original_len,
            payload,
        }
    }

    /// Number of payload bytes actually captured
    pub fn captured_len(&self) -> u32 {
        self.payload.len() as u32
    }

    /// Total encoded size (header + payload)
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    /// Whether the capture was truncated (snapshot shorter than the packet)
    pub fn is_truncated(&self) -> bool {
        self.captured_len() < self.original_len
    }

    /// Capture timestamp as a `SystemTime`
    pub fn captured_at(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH
            + Duration::new(u64::from(self.ts_sec), self.ts_usec.saturating_mul(1000))
    }
}

/// Decode the next complete frame from the accumulation buffer
///
/// Consumes exactly `HEADER_LEN + captured_length` bytes and returns the
/// frame, or returns `None` without consuming anything if the buffer does not
/// yet hold a complete frame. A captured length of zero is a valid keep-alive
/// frame and still advances the buffer by the header.
pub fn decode_next(buf: &mut BytesMut) -> Option<Frame> {
    if buf.len() < HEADER_LEN {
        return None;
    }

    // Peek the captured length before committing to consume anything
    let captured = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;
    let total = HEADER_LEN + captured;
    if buf.len() < total {
        return None;
    }

    let mut frame = buf.split_to(total).freeze();
    let ts_sec = frame.get_u32_le();
    let ts_usec = frame.get_u32_le();
    let _captured_len = frame.get_u32_le();
    let original_len = frame.get_u32_le();

    // `frame` now holds exactly `captured` payload bytes
    Some(Frame {
        ts_sec,
        ts_usec,
        original_len,
        payload: frame,
    })
}

/// Encode a frame (header + payload) into the output buffer
///
/// The record layout is identical on the agent wire, in trace files, and on
/// viewer streams; payload bytes pass through unchanged.
pub fn encode(frame: &Frame, out: &mut BytesMut) {
    out.reserve(frame.encoded_len());
    out.put_u32_le(frame.ts_sec);
    out.put_u32_le(frame.ts_usec);
    out.put_u32_le(frame.captured_len());
    out.put_u32_le(frame.original_len);
    out.extend_from_slice(&frame.payload);
}
