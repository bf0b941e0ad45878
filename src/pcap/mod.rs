//! pcap trace container
//!
//! Both the per-source trace files and the live viewer streams use the
//! classic libpcap container: one 24-byte global header, then one record per
//! frame. Record headers share the exact field layout of the agent wire
//! protocol, so frames are re-emitted without transformation.

pub mod writer;

pub use writer::TraceWriter;

/// pcap magic for microsecond-resolution files, written little-endian
pub const MAGIC: u32 = 0xa1b2_c3d4;

/// pcap format version written in the global header
pub const VERSION_MAJOR: u16 = 2;
pub const VERSION_MINOR: u16 = 4;

/// Link type for Ethernet frames
pub const LINKTYPE_ETHERNET: u32 = 1;

/// Snapshot length advertised by default, matching the agents' capture size
pub const DEFAULT_SNAPLEN: u32 = 1024;

/// Size of the pcap global header in bytes
pub const FILE_HEADER_LEN: usize = 24;

/// Build the pcap global header for an Ethernet capture
///
/// Written once at the start of every trace file and immediately after every
/// viewer connection is accepted, so a viewer attaching mid-stream still sees
/// a valid capture container.
pub fn file_header(snaplen: u32) -> [u8; FILE_HEADER_LEN] {
    let mut header = [0u8; FILE_HEADER_LEN];
    header[0..4].copy_from_slice(&MAGIC.to_le_bytes());
    header[4..6].copy_from_slice(&VERSION_MAJOR.to_le_bytes());
    header[6..8].copy_from_slice(&VERSION_MINOR.to_le_bytes());
    // thiszone and sigfigs stay zero
    header[16..20].copy_from_slice(&snaplen.to_le_bytes());
    header[20..24].copy_from_slice(&LINKTYPE_ETHERNET.to_le_bytes());
    header
}
