//! Trace file writer
//!
//! One `TraceWriter` per source, append-only. A write failure is reported to
//! the caller and disables nothing by itself; the owning reader decides
//! whether to keep relaying (it does — trace loss never stops the live
//! stream).

use std::path::{Path, PathBuf};

use bytes::BytesMut;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::codec::{self, Frame};
use crate::error::{Error, Result};

/// Append-only pcap file writer for a single source
pub struct TraceWriter {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    records: u64,
    bytes: u64,
}

impl TraceWriter {
    /// Create the trace file and write the pcap global header
    pub async fn create(path: impl AsRef<Path>, snaplen: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).await.map_err(|e| Error::Trace {
            path: path.clone(),
            source: e,
        })?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(&super::file_header(snaplen))
            .await
            .map_err(|e| Error::Trace {
                path: path.clone(),
                source: e,
            })?;

        tracing::debug!(path = %path.display(), "Trace file opened");

        Ok(Self {
            path,
            file: Some(writer),
            records: 0,
            bytes: 0,
        })
    }

    /// Append one record (header + payload) to the trace file
    ///
    /// Zero-length payloads are legal records; the header alone is written.
    pub async fn write(&mut self, frame: &Frame) -> Result<()> {
        let file = self.file.as_mut().ok_or_else(|| Error::TraceClosed {
            path: self.path.clone(),
        })?;

        let mut record = BytesMut::with_capacity(frame.encoded_len());
        codec::encode(frame, &mut record);
        file.write_all(&record).await.map_err(|e| Error::Trace {
            path: self.path.clone(),
            source: e,
        })?;

        self.records += 1;
        self.bytes += frame.payload.len() as u64;
        Ok(())
    }

    /// Flush buffered records and release the file handle
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().await.map_err(|e| Error::Trace {
                path: self.path.clone(),
                source: e,
            })?;
            tracing::debug!(
                path = %self.path.display(),
                records = self.records,
                bytes = self.bytes,
                "Trace file closed"
            );
        }
        Ok(())
    }

    /// Whether the writer still holds an open file handle
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the trace file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Total payload bytes written so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::codec::HEADER_LEN;
    use crate::pcap::FILE_HEADER_LEN;

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    #[tokio::test]
    async fn test_create_writes_file_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "header.pcap");

        let mut writer = TraceWriter::create(&path, 1024).await.unwrap();
        writer.close().await.unwrap();

        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents.len(), FILE_HEADER_LEN);
        assert_eq!(&contents[0..4], &[0xd4, 0xc3, 0xb2, 0xa1]);
        assert_eq!(&contents[16..20], &1024u32.to_le_bytes());
    }

    #[tokio::test]
    async fn test_write_appends_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "one.pcap");

        let frame = Frame::new(100, 200, 4, Bytes::from_static(b"DEAD"));
        let mut writer = TraceWriter::create(&path, 1024).await.unwrap();
        writer.write(&frame).await.unwrap();
        assert_eq!(writer.records(), 1);
        assert_eq!(writer.bytes(), 4);
        writer.close().await.unwrap();

        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents.len(), FILE_HEADER_LEN + HEADER_LEN + 4);

        let record = &contents[FILE_HEADER_LEN..];
        assert_eq!(&record[0..4], &100u32.to_le_bytes());
        assert_eq!(&record[4..8], &200u32.to_le_bytes());
        assert_eq!(&record[8..12], &4u32.to_le_bytes());
        assert_eq!(&record[12..16], &4u32.to_le_bytes());
        assert_eq!(&record[16..], b"DEAD");
    }

    #[tokio::test]
    async fn test_zero_length_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "keepalive.pcap");

        let keepalive = Frame::new(1, 0, 0, Bytes::new());
        let mut writer = TraceWriter::create(&path, 1024).await.unwrap();
        writer.write(&keepalive).await.unwrap();
        writer.close().await.unwrap();

        let contents = std::fs::read(&path).unwrap();
        assert_eq!(contents.len(), FILE_HEADER_LEN + HEADER_LEN);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "close.pcap");

        let mut writer = TraceWriter::create(&path, 1024).await.unwrap();
        writer.close().await.unwrap();
        writer.close().await.unwrap();
        assert!(!writer.is_open());
    }

    #[tokio::test]
    async fn test_write_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "closed.pcap");

        let mut writer = TraceWriter::create(&path, 1024).await.unwrap();
        writer.close().await.unwrap();

        let frame = Frame::new(1, 2, 4, Bytes::from_static(b"DEAD"));
        let result = writer.write(&frame).await;
        assert!(matches!(result, Err(Error::TraceClosed { .. })));
    }

    #[tokio::test]
    async fn test_create_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("trace.pcap");

        let result = TraceWriter::create(&path, 1024).await;
        assert!(matches!(result, Err(Error::Trace { .. })));
    }
}
