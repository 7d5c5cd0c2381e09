//! Index
//!
//! Fixed-width, memory-mapped map from a record's relative offset to its
//! byte position in the store. The file is grown to its configured maximum
//! up front so the mapping never moves, and truncated back to the occupied
//! prefix on close so the file length doubles as the entry count.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::error::{Result, RiftError};

/// Width of one index entry: relative offset (4) + position (8)
pub const ENT_WIDTH: u64 = 12;

/// Width of the relative-offset field
const OFF_WIDTH: u64 = 4;

/// Memory-mapped offset index for one segment
///
/// Not internally locked; writes are serialized by the owning segment,
/// which the log serializes in turn. Concurrent reads are safe.
pub struct Index {
    /// File path, kept for removal
    path: PathBuf,

    /// Backing file, held open for the index's lifetime
    file: File,

    /// Writable mapping over the full pre-allocated file; None once closed
    mmap: Option<MmapMut>,

    /// Bytes occupied by valid entries (logical size)
    size: u64,
}

impl Index {
    /// Open or create an index file sized to `max_index_bytes`
    ///
    /// The logical size starts at the existing file length, validated
    /// against the entries themselves: a crash between the pre-allocation
    /// grow and the truncate-on-close leaves a zero tail, which is
    /// recognized by entries whose stored relative offset does not match
    /// their slot and dropped.
    pub fn open(path: &Path, max_index_bytes: u64) -> Result<Self> {
        let max = max_index_bytes - max_index_bytes % ENT_WIDTH;
        if max < ENT_WIDTH {
            return Err(RiftError::Config(format!(
                "max_index_bytes {} below entry width {}",
                max_index_bytes, ENT_WIDTH
            )));
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;

        let raw_len = file.metadata()?.len();
        let mut size = (raw_len - raw_len % ENT_WIDTH).min(max);

        file.set_len(max)?;
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        // Zero-tail probe: entry N stores relative offset N, so a slot
        // whose stored offset disagrees with its position is padding, not
        // data. Entry 0 is all zeros by construction and stays.
        while size >= 2 * ENT_WIDTH {
            let last = size / ENT_WIDTH - 1;
            let at = (last * ENT_WIDTH) as usize;
            let rel = u32::from_be_bytes(mmap[at..at + OFF_WIDTH as usize].try_into().unwrap());
            if u64::from(rel) == last {
                break;
            }
            size -= ENT_WIDTH;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mmap: Some(mmap),
            size,
        })
    }

    /// Append an entry mapping `rel_offset` to `pos`
    ///
    /// Fails with end-of-data once the pre-allocated space is exhausted.
    pub fn write(&mut self, rel_offset: u32, pos: u64) -> Result<()> {
        let size = self.size;
        let mmap = self.mmap_mut()?;
        if size + ENT_WIDTH > mmap.len() as u64 {
            return Err(RiftError::EndOfData);
        }

        let at = size as usize;
        mmap[at..at + OFF_WIDTH as usize].copy_from_slice(&rel_offset.to_be_bytes());
        mmap[at + OFF_WIDTH as usize..at + ENT_WIDTH as usize]
            .copy_from_slice(&pos.to_be_bytes());

        self.size += ENT_WIDTH;
        Ok(())
    }

    /// Read the entry at index `i`; `-1` reads the last entry
    ///
    /// Fails with end-of-data on an empty index or an `i` at or past the
    /// last written entry.
    pub fn read(&self, i: i64) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(RiftError::EndOfData);
        }

        let entries = self.size / ENT_WIDTH;
        let entry = if i < 0 { entries - 1 } else { i as u64 };
        if entry >= entries {
            return Err(RiftError::EndOfData);
        }

        let mmap = self.mmap_ref()?;
        let at = (entry * ENT_WIDTH) as usize;
        let rel = u32::from_be_bytes(mmap[at..at + OFF_WIDTH as usize].try_into().unwrap());
        let pos = u64::from_be_bytes(
            mmap[at + OFF_WIDTH as usize..at + ENT_WIDTH as usize]
                .try_into()
                .unwrap(),
        );

        Ok((rel, pos))
    }

    /// Bytes occupied by valid entries
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Sync the mapping and shrink the file back to its logical size
    ///
    /// Idempotent: a second call is a no-op, so `Drop` can retry safely.
    pub fn close(&mut self) -> Result<()> {
        let Some(mmap) = self.mmap.take() else {
            return Ok(());
        };

        mmap.flush()?;
        drop(mmap);
        self.file.sync_all()?;
        self.file.set_len(self.size)?;
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mmap_ref(&self) -> Result<&MmapMut> {
        self.mmap
            .as_ref()
            .ok_or_else(|| RiftError::Io(io::Error::new(io::ErrorKind::Other, "index is closed")))
    }

    fn mmap_mut(&mut self) -> Result<&mut MmapMut> {
        self.mmap
            .as_mut()
            .ok_or_else(|| RiftError::Io(io::Error::new(io::ErrorKind::Other, "index is closed")))
    }
}

impl Drop for Index {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("failed to close index {}: {}", self.path.display(), e);
        }
    }
}
