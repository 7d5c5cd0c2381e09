//! Segment
//!
//! Binds one store and one index into a single addressable unit covering a
//! contiguous range of offsets, translating between absolute offsets and
//! the index's relative ones.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::SegmentConfig;
use crate::error::{Result, RiftError};
use crate::record::Record;

use super::{Index, Store};

/// One (store, index) pair in the log
pub struct Segment {
    /// Record payloads; shared with the log's stream reader
    store: Arc<Store>,

    /// Relative offset → store position
    index: Index,

    /// Offset of the first record; fixed at creation, embedded in the
    /// segment's filenames
    base_offset: u64,

    /// Offset the next appended record will be assigned
    next_offset: u64,

    /// Size caps
    config: SegmentConfig,
}

impl Segment {
    /// Open or create the segment with the given base offset
    ///
    /// The next offset is recovered from the index: one past the last
    /// entry, or the base offset for a fresh segment.
    pub fn open(dir: &Path, base_offset: u64, config: SegmentConfig) -> Result<Self> {
        let store = Store::open(&dir.join(format!("{}.store", base_offset)))?;
        let index = Index::open(
            &dir.join(format!("{}.index", base_offset)),
            config.max_index_bytes,
        )?;

        let next_offset = match index.read(-1) {
            Ok((rel, _)) => base_offset + u64::from(rel) + 1,
            Err(RiftError::EndOfData) => base_offset,
            Err(e) => return Err(e),
        };

        Ok(Self {
            store: Arc::new(store),
            index,
            base_offset,
            next_offset,
            config,
        })
    }

    /// Append a record, assigning it the segment's next offset
    ///
    /// The store write lands before the index entry; if the index write
    /// fails, the trailing store bytes are unreachable garbage and the
    /// segment rolls on the next maxed check.
    pub fn append(&mut self, record: &mut Record) -> Result<u64> {
        record.offset = self.next_offset;
        let encoded = record.encode();

        let (_, pos) = self.store.append(&encoded)?;
        self.index
            .write((self.next_offset - self.base_offset) as u32, pos)?;

        self.next_offset += 1;
        Ok(record.offset)
    }

    /// Read the record at an absolute offset
    ///
    /// The caller guarantees the offset falls within
    /// `[base_offset, next_offset)`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let rel = offset - self.base_offset;
        let (_, pos) = self.index.read(rel as i64)?;
        let bytes = self.store.read(pos)?;
        Record::decode(&bytes)
    }

    /// Whether the store or index has reached its configured ceiling
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
    }

    /// Close the index (sync + shrink) and flush the store
    pub fn close(&mut self) -> Result<()> {
        self.index.close()?;
        self.store.close()
    }

    /// Close the segment and unlink both of its files
    pub fn remove(mut self) -> Result<()> {
        self.close()?;
        fs::remove_file(self.index.path())?;
        fs::remove_file(self.store.path())?;
        Ok(())
    }

    /// Offset of the first record in this segment
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Offset the next append would be assigned
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Shared handle on the segment's store, for the log's stream reader
    pub(crate) fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }
}
