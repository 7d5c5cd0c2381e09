//! # riftlog
//!
//! A persistent, append-only commit log with:
//! - Monotonically increasing 64-bit offsets assigned on append
//! - Two-file segments: a length-prefixed store and a memory-mapped index
//! - Segment rollover at configurable size thresholds
//! - Prefix truncation to reclaim disk
//! - TCP-based produce/consume protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                             │
//! │                  (Multiple Clients)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Log                                  │
//! │          (RwLock'd segment list, last = active)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼────────────┐
//!          ▼            ▼            ▼
//!   ┌───────────┐ ┌───────────┐ ┌───────────┐
//!   │ Segment 0 │ │ Segment A │ │ Segment B │  ← active
//!   │store+index│ │store+index│ │store+index│
//!   └───────────┘ └───────────┘ └───────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod log;
pub mod network;
pub mod protocol;
pub mod record;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, SegmentConfig};
pub use error::{Result, RiftError};
pub use log::Log;
pub use record::Record;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of riftlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
