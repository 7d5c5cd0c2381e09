//! Connection Handler
//!
//! Handles individual client connections: reads commands off the stream,
//! runs consumes against the shared log, and relays produces through the
//! appender queue.

use std::io::BufReader;
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{bounded, Sender};

use crate::error::{Result, RiftError};
use crate::log::Log;
use crate::protocol::{read_command, write_response, Command, Response};

use super::server::AppendRequest;

/// Handles a single client connection
pub struct Connection {
    /// Client stream
    stream: TcpStream,

    /// Shared log, for the read-side commands
    log: Arc<Log>,

    /// Queue into the appender thread
    appends: Sender<AppendRequest>,

    /// Peer address, for logging
    peer: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, log: Arc<Log>, appends: Sender<AppendRequest>) -> Result<Self> {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        Ok(Self {
            stream,
            log,
            appends,
            peer,
        })
    }

    /// Set read and write timeouts on the underlying stream
    pub fn set_timeouts(&self, read_ms: u64, write_ms: u64) -> Result<()> {
        self.stream
            .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        self.stream
            .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        Ok(())
    }

    /// Handle the connection (blocking until the client disconnects)
    ///
    /// Clients may pipeline: each loop iteration reads one command and
    /// writes one response. Streamed produce/consume is this loop driven
    /// repeatedly by the client.
    pub fn handle(&mut self) -> Result<()> {
        let mut reader = BufReader::new(self.stream.try_clone()?);

        loop {
            let command = match read_command(&mut reader) {
                Ok(command) => command,
                // Clean disconnect between frames
                Err(RiftError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            tracing::trace!(peer = %self.peer, ?command, "executing command");
            let response = self.execute(command);
            write_response(&mut self.stream, &response)?;
        }
    }

    /// Execute one command, mapping errors to statuses
    fn execute(&self, command: Command) -> Response {
        match command {
            Command::Produce { value } => self.produce(value),
            Command::Consume { offset } => self.consume(offset),

            Command::Offsets => {
                let mut payload = Vec::with_capacity(16);
                payload.extend_from_slice(&self.log.lowest_offset().to_be_bytes());
                payload.extend_from_slice(&self.log.highest_offset().to_be_bytes());
                Response::ok(payload)
            }

            Command::Ping => Response::ok(b"PONG".to_vec()),
        }
    }

    /// Queue the value for the appender and wait for its outcome
    ///
    /// Blocks while the append queue is full; that backpressure is the
    /// produce path's flow control.
    fn produce(&self, value: Vec<u8>) -> Response {
        let (reply_tx, reply_rx) = bounded(1);

        let request = AppendRequest {
            value,
            reply: reply_tx,
        };
        if self.appends.send(request).is_err() {
            return Response::error("log is shutting down");
        }

        match reply_rx.recv() {
            Ok(Ok(offset)) => Response::ok(offset.to_be_bytes().to_vec()),
            Ok(Err(message)) => {
                tracing::error!(peer = %self.peer, "produce failed: {}", message);
                Response::error(message)
            }
            Err(_) => Response::error("log is shutting down"),
        }
    }

    /// Read one record straight off the log's shared lock
    fn consume(&self, offset: u64) -> Response {
        match self.log.read(offset) {
            Ok(record) => Response::ok(record.encode()),
            Err(e @ RiftError::OffsetOutOfRange { .. }) => Response::not_found(e.to_string()),
            Err(e) => {
                tracing::error!(peer = %self.peer, offset, "consume failed: {}", e);
                Response::error(e.to_string())
            }
        }
    }

    /// Peer address for logging
    pub fn peer_addr(&self) -> &str {
        &self.peer
    }
}
