//! Log
//!
//! The log aggregate: an ordered list of segments over one directory, with
//! the last segment active for appends. Reads fan out to whichever segment
//! covers the requested offset; appends roll the active segment once it
//! reaches its configured size.
//!
//! ## Concurrency:
//! - `segments`: RwLock — appends, rollover, and truncation take it
//!   exclusively; reads and offset queries share it
//! - Store internals carry their own mutex, so shared-lock readers may
//!   touch files concurrently

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{Result, RiftError};
use crate::record::Record;

use super::{Segment, Store};

/// Built-in segment size limit applied when the config leaves one at zero
const DEFAULT_SEGMENT_BYTES: u64 = 1024;

/// Persistent append-only commit log
pub struct Log {
    /// Directory holding every segment's files
    dir: PathBuf,

    /// Normalized configuration
    config: Config,

    /// Segments ordered by base offset ascending; the last one is active.
    /// Never empty after open.
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Open or create a log in the given directory
    ///
    /// Existing segments are discovered from their filenames; an empty
    /// directory gets a single segment at the configured initial offset.
    /// Zero segment byte limits fall back to built-in defaults.
    pub fn open(dir: &Path, mut config: Config) -> Result<Self> {
        if config.segment.max_store_bytes == 0 {
            config.segment.max_store_bytes = DEFAULT_SEGMENT_BYTES;
        }
        if config.segment.max_index_bytes == 0 {
            config.segment.max_index_bytes = DEFAULT_SEGMENT_BYTES;
        }

        fs::create_dir_all(dir)?;
        let segments = Self::load_segments(dir, &config)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            config,
            segments: RwLock::new(segments),
        })
    }

    /// Discover segment files and open a segment per distinct base offset
    fn load_segments(dir: &Path, config: &Config) -> Result<Vec<Segment>> {
        let mut base_offsets: Vec<u64> = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(base) = Self::parse_base_offset(&path) {
                base_offsets.push(base);
            }
        }

        // Each base offset appears twice, once per .store and .index file
        base_offsets.sort_unstable();
        base_offsets.dedup();

        let mut segments = Vec::with_capacity(base_offsets.len().max(1));
        for base in &base_offsets {
            segments.push(Segment::open(dir, *base, config.segment)?);
        }

        if segments.is_empty() {
            segments.push(Segment::open(dir, config.segment.initial_offset, config.segment)?);
        }

        tracing::debug!(
            dir = %dir.display(),
            segments = segments.len(),
            "log opened"
        );

        Ok(segments)
    }

    /// Parse a segment base offset from a filename
    /// "42.store" → Some(42)
    fn parse_base_offset(path: &Path) -> Option<u64> {
        path.file_stem()?.to_string_lossy().parse().ok()
    }

    /// Append a record, returning its assigned offset
    ///
    /// The maxed check runs after the append, so a single record may push
    /// the active segment past its limits; this guarantees every record
    /// fits in exactly one segment regardless of its size.
    pub fn append(&self, record: &mut Record) -> Result<u64> {
        let mut segments = self.segments.write();

        let active = segments.last_mut().expect("log has no segments");
        let offset = active.append(record)?;

        if active.is_maxed() {
            tracing::debug!(base_offset = offset + 1, "rolling active segment");
            segments.push(Segment::open(&self.dir, offset + 1, self.config.segment)?);
        }

        Ok(offset)
    }

    /// Read the record at the given offset
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.segments.read();

        let segment = segments
            .iter()
            .find(|s| s.base_offset() <= offset && offset < s.next_offset())
            .ok_or(RiftError::OffsetOutOfRange { offset })?;

        segment.read(offset)
    }

    /// Lowest offset held by the log
    pub fn lowest_offset(&self) -> u64 {
        let segments = self.segments.read();
        segments.first().expect("log has no segments").base_offset()
    }

    /// Highest offset held by the log, or 0 when nothing has been appended
    pub fn highest_offset(&self) -> u64 {
        let segments = self.segments.read();
        let next = segments.last().expect("log has no segments").next_offset();
        next.saturating_sub(1)
    }

    /// Remove every segment whose records all sit at or below `lowest`
    ///
    /// Reclaims disk for consumed prefixes. The active segment is never
    /// removed; a cut at or past it succeeds without touching it.
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut segments = self.segments.write();

        let old = std::mem::take(&mut *segments);
        let count = old.len();
        for (i, segment) in old.into_iter().enumerate() {
            let active = i + 1 == count;
            if !active && segment.next_offset() <= lowest + 1 {
                tracing::debug!(
                    base_offset = segment.base_offset(),
                    "removing truncated segment"
                );
                segment.remove()?;
            } else {
                segments.push(segment);
            }
        }

        Ok(())
    }

    /// Close every segment, stopping at the first error
    pub fn close(&self) -> Result<()> {
        let mut segments = self.segments.write();
        Self::close_segments(&mut segments)
    }

    /// Close the log and delete its directory
    pub fn remove(&self) -> Result<()> {
        let mut segments = self.segments.write();
        Self::close_segments(&mut segments)?;
        segments.clear();
        fs::remove_dir_all(&self.dir)?;
        Ok(())
    }

    /// Remove the log's contents and set it up fresh
    pub fn reset(&self) -> Result<()> {
        let mut segments = self.segments.write();
        Self::close_segments(&mut segments)?;
        segments.clear();
        fs::remove_dir_all(&self.dir)?;
        fs::create_dir_all(&self.dir)?;
        *segments = Self::load_segments(&self.dir, &self.config)?;
        Ok(())
    }

    fn close_segments(segments: &mut Vec<Segment>) -> Result<()> {
        for segment in segments.iter_mut() {
            segment.close()?;
        }
        Ok(())
    }

    /// Sequential reader over the concatenated store files, in base offset
    /// order, yielding the raw length-prefixed byte stream as written
    pub fn reader(&self) -> LogReader {
        let segments = self.segments.read();
        LogReader {
            stores: segments.iter().map(|s| s.store()).collect(),
            current: 0,
            position: 0,
        }
    }

    /// Directory this log lives in
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Byte stream over every store file in the log, for bulk copy
pub struct LogReader {
    /// Store handles snapshotted at creation, base offset order
    stores: Vec<Arc<Store>>,

    /// Index of the store currently being read
    current: usize,

    /// Byte position within the current store
    position: u64,
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.current < self.stores.len() {
            let n = self.stores[self.current]
                .read_at(buf, self.position)
                .map_err(|e| match e {
                    RiftError::Io(io_err) => io_err,
                    other => io::Error::new(io::ErrorKind::Other, other.to_string()),
                })?;

            if n > 0 {
                self.position += n as u64;
                return Ok(n);
            }

            self.current += 1;
            self.position = 0;
        }

        Ok(0)
    }
}
