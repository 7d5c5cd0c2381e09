//! Record envelope
//!
//! The unit of data stored in the log: an opaque value plus the offset the
//! log assigned on append.
//!
//! ## Serialized Format
//! ```text
//! ┌────────────┬──────────┬──────────────┐
//! │ Offset (8) │ CRC (4)  │ Value (N)    │
//! └────────────┴──────────┴──────────────┘
//! ```
//! All integers big-endian. The CRC covers the value bytes only; the
//! store's own length prefix frames the envelope on disk.

use crate::error::{Result, RiftError};

/// Envelope header size: offset (8) + CRC32 (4)
pub const ENVELOPE_HEADER: usize = 12;

/// A record in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Opaque payload; the log never interprets it
    pub value: Vec<u8>,

    /// Offset assigned by the log on append
    pub offset: u64,
}

impl Record {
    /// Create a record awaiting an offset assignment
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            offset: 0,
        }
    }

    /// Serialize to the envelope format
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ENVELOPE_HEADER + self.value.len());
        buf.extend_from_slice(&self.offset.to_be_bytes());
        buf.extend_from_slice(&crc32fast::hash(&self.value).to_be_bytes());
        buf.extend_from_slice(&self.value);
        buf
    }

    /// Deserialize from the envelope format
    ///
    /// Fails if the input is shorter than the header or the value does not
    /// match its checksum.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ENVELOPE_HEADER {
            return Err(RiftError::Corruption(format!(
                "envelope too short: {} bytes (header is {})",
                bytes.len(),
                ENVELOPE_HEADER
            )));
        }

        let offset = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        let stored_crc = u32::from_be_bytes(bytes[8..12].try_into().unwrap());

        let value = bytes[ENVELOPE_HEADER..].to_vec();
        let computed_crc = crc32fast::hash(&value);
        if stored_crc != computed_crc {
            return Err(RiftError::Corruption(format!(
                "CRC mismatch at offset {}: stored {:#010x}, computed {:#010x}",
                offset, stored_crc, computed_crc
            )));
        }

        Ok(Self { value, offset })
    }

    /// Size of the serialized envelope in bytes
    pub fn encoded_len(&self) -> usize {
        ENVELOPE_HEADER + self.value.len()
    }
}
