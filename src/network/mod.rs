//! Network Module
//!
//! TCP serving surface over the log.
//!
//! ## Architecture
//! - Acceptor thread; one serving thread per connection
//! - A single appender thread owns the log's write path; produces reach
//!   it over a bounded queue, reads hit the log's shared lock directly

mod connection;
mod server;

pub(crate) use connection::Connection;
pub use server::{Server, ShutdownHandle};
