//! Store
//!
//! Append-only file of length-prefixed record payloads. Appends go through
//! a buffered writer to amortize system calls; every read path flushes the
//! buffer first so a record is readable as soon as `append` returns.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Result, RiftError};

/// Width of the length prefix framing each payload
pub const LEN_WIDTH: u64 = 8;

/// Append-only store file
///
/// ## Concurrency:
/// - All file state (writer buffer, read handle, size) lives behind one
///   Mutex, held for the duration of each operation
/// - Methods take `&self`; a store is shared freely within a segment
pub struct Store {
    /// File path, kept for removal
    path: PathBuf,

    /// Mutable file state
    inner: Mutex<StoreState>,
}

struct StoreState {
    /// Open handles; None once closed
    files: Option<StoreFiles>,

    /// File length in bytes; also the position of the next entry.
    /// Outlives the handles so `size` stays observable after close.
    size: u64,
}

struct StoreFiles {
    /// Buffered append handle
    writer: BufWriter<File>,

    /// Separate handle for positioned reads
    reader: File,
}

impl Store {
    /// Open or create a store file
    ///
    /// The size picks up from the existing file length, so reopening a
    /// store continues appending where the last session left off.
    pub fn open(path: &Path) -> Result<Self> {
        let writer = OpenOptions::new().create(true).append(true).open(path)?;
        let reader = OpenOptions::new().read(true).open(path)?;
        let size = reader.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(StoreState {
                files: Some(StoreFiles {
                    writer: BufWriter::new(writer),
                    reader,
                }),
                size,
            }),
        })
    }

    /// Append a payload, framed by its big-endian length
    ///
    /// Returns the number of bytes written (prefix included) and the byte
    /// position the entry starts at.
    pub fn append(&self, payload: &[u8]) -> Result<(u64, u64)> {
        let mut state = self.inner.lock();

        let pos = state.size;
        let files = state.files.as_mut().ok_or_else(closed_error)?;
        files.writer.write_all(&(payload.len() as u64).to_be_bytes())?;
        files.writer.write_all(payload)?;

        let written = LEN_WIDTH + payload.len() as u64;
        state.size += written;

        Ok((written, pos))
    }

    /// Read the payload of the entry starting at `pos`
    pub fn read(&self, pos: u64) -> Result<Vec<u8>> {
        let mut state = self.inner.lock();
        let files = state.files.as_mut().ok_or_else(closed_error)?;
        files.writer.flush()?;

        let mut len_buf = [0u8; LEN_WIDTH as usize];
        files.reader.seek(SeekFrom::Start(pos))?;
        files.reader.read_exact(&mut len_buf)?;

        let len = u64::from_be_bytes(len_buf);
        let mut payload = vec![0u8; len as usize];
        files.reader.read_exact(&mut payload)?;

        Ok(payload)
    }

    /// Read raw bytes at a file offset into the caller's buffer
    ///
    /// Returns the number of bytes read; 0 means the offset is at or past
    /// the end of the store. Backs the log's sequential byte reader.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut state = self.inner.lock();

        let size = state.size;
        let files = state.files.as_mut().ok_or_else(closed_error)?;
        files.writer.flush()?;

        if offset >= size {
            return Ok(0);
        }

        files.reader.seek(SeekFrom::Start(offset))?;
        let n = files.reader.read(buf)?;
        Ok(n)
    }

    /// Current store size in bytes
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Flush buffered appends to the OS and close both file handles
    ///
    /// Later appends and reads fail; `size` stays observable. Idempotent:
    /// a second call is a no-op. Durability is best-effort up to the OS
    /// page cache; there is no fsync on this path.
    pub fn close(&self) -> Result<()> {
        let mut state = self.inner.lock();
        let Some(mut files) = state.files.take() else {
            return Ok(());
        };

        files.writer.flush()?;
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn closed_error() -> RiftError {
    RiftError::Io(io::Error::new(io::ErrorKind::Other, "store is closed"))
}
