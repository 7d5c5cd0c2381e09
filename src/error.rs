//! Error types for riftlog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using RiftError
pub type Result<T> = std::result::Result<T, RiftError>;

/// Unified error type for riftlog operations
#[derive(Debug, Error)]
pub enum RiftError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Log Errors
    // -------------------------------------------------------------------------
    #[error("offset out of range: {offset}")]
    OffsetOutOfRange { offset: u64 },

    /// Index probe with no entries or past the last written entry, or a
    /// write into an index with no room left. Consumed internally on the
    /// segment reopen path; surfaces on appends into a full index.
    #[error("end of data")]
    EndOfData,

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("corrupt record: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),
}
