//! Log Module
//!
//! Persistent append-only commit log: an ordered sequence of records, each
//! addressed by a monotonically increasing 64-bit offset.
//!
//! ## Layout
//!
//! A log is a directory of segments. Each segment contributes two files
//! named after the offset of its first record:
//!
//! ```text
//! {base_offset}.store    length-prefixed record payloads, append order
//! {base_offset}.index    fixed-width entries mapping offsets to positions
//! ```
//!
//! ## Store File Format
//! ```text
//! ┌─────────┬──────────────┬─────────┬──────────────┬───┐
//! │ Len (8) │ Payload      │ Len (8) │ Payload      │...│
//! └─────────┴──────────────┴─────────┴──────────────┴───┘
//! ```
//!
//! ## Index File Format
//! ```text
//! ┌──────────────┬──────────────┬───┐
//! │ Entry (12)   │ Entry (12)   │...│
//! │ ┌────┬─────┐ │              │   │
//! │ │Rel │ Pos │ │              │   │
//! │ │(4) │ (8) │ │              │   │
//! │ └────┴─────┘ │              │   │
//! └──────────────┴──────────────┴───┘
//! ```
//!
//! All integers big-endian. `Rel` is the record's offset relative to the
//! segment's base offset; `Pos` is the byte position of the record's
//! length prefix in the store file. The index file is pre-allocated to its
//! configured maximum and truncated back to the occupied prefix on close.

mod commit_log;
mod index;
mod segment;
mod store;

pub use commit_log::{Log, LogReader};
pub use index::{Index, ENT_WIDTH};
pub use segment::Segment;
pub use store::{Store, LEN_WIDTH};
