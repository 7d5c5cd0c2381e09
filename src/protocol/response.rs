//! Response definitions
//!
//! Represents responses sent back to clients.

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// A response to a client command
#[derive(Debug, Clone)]
pub struct Response {
    /// Outcome of the command
    pub status: Status,

    /// Status-dependent payload; None encodes as zero length
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Successful response carrying a payload
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            status: Status::Ok,
            payload: Some(payload),
        }
    }

    /// The requested offset is outside the log
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: Status::NotFound,
            payload: Some(message.into().into_bytes()),
        }
    }

    /// Command failed; the payload carries the message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.into().into_bytes()),
        }
    }
}
