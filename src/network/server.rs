//! TCP Server
//!
//! Serves the produce/consume protocol over a shared log.
//!
//! ## Threading
//!
//! The log admits one appender at a time (its write lock) but any number
//! of concurrent readers. The server is shaped around that split:
//!
//! - Every accepted client gets its own connection thread, bounded by the
//!   configured connection limit. Consumes, offset queries, and pings run
//!   there directly under the log's shared lock.
//! - Produces are forwarded to a single appender thread over a bounded
//!   queue and applied in arrival order. A full queue blocks producers at
//!   the channel instead of stacking threads on the write lock while the
//!   active segment rolls.
//!
//! ```text
//!  conn thread ──consume──────────────► Log (shared lock)
//!  conn thread ──produce──► queue ──► appender thread ──► Log (exclusive)
//!  conn thread ──produce──►   ▲
//!                        (bounded)
//! ```

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::config::Config;
use crate::error::{Result, RiftError};
use crate::log::Log;
use crate::protocol::{write_response, Response};
use crate::record::Record;

use super::Connection;

/// Produces admitted ahead of the appender before senders block
const APPEND_QUEUE_DEPTH: usize = 64;

/// Outcome of one queued append: the assigned offset, or the error text
/// relayed back to the producing client
pub(crate) type AppendReply = std::result::Result<u64, String>;

/// One produce in flight from a connection thread to the appender
pub(crate) struct AppendRequest {
    /// Raw record value from the client
    pub(crate) value: Vec<u8>,

    /// Where the appender sends the outcome
    pub(crate) reply: Sender<AppendReply>,
}

/// TCP server fronting a log
pub struct Server {
    /// Server configuration
    config: Config,

    /// Shared log
    log: Arc<Log>,

    /// Bound TCP listener
    listener: TcpListener,

    /// Shutdown flag
    shutdown: Arc<AtomicBool>,

    /// Live connection count, enforced against the configured limit
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Bind to the configured address
    ///
    /// Binding happens here rather than in `run` so callers can learn the
    /// bound address (port 0 picks a free one) before serving starts.
    pub fn bind(config: Config, log: Arc<Log>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            RiftError::Network(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

        // Non-blocking so the accept loop can check the shutdown flag
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            log,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Serve connections (blocking)
    ///
    /// Accepts until shutdown is signaled, then drains: the append queue
    /// disconnects, live connections finish (bounded by their read
    /// timeout), and the appender exits once the last sender is gone.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("Server listening on {}", self.config.listen_addr);

        let (append_tx, append_rx) = bounded::<AppendRequest>(APPEND_QUEUE_DEPTH);

        let appender = {
            let log = Arc::clone(&self.log);
            thread::Builder::new()
                .name("riftlog-appender".to_string())
                .spawn(move || append_loop(log, append_rx))
                .map_err(|e| RiftError::Network(format!("Failed to spawn appender: {}", e)))?
        };

        let mut connections: Vec<JoinHandle<()>> = Vec::new();

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    connections.retain(|handle| !handle.is_finished());

                    // The listener is non-blocking; connections must not be
                    let _ = stream.set_nonblocking(false);

                    if self.active_connections.load(Ordering::Relaxed)
                        >= self.config.max_connections
                    {
                        tracing::warn!(
                            "Connection limit ({}) reached, refusing {}",
                            self.config.max_connections,
                            addr
                        );
                        refuse(stream);
                        continue;
                    }

                    tracing::debug!("Accepted connection from {}", addr);
                    self.spawn_connection(stream, addr, &append_tx, &mut connections);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // No pending connections, sleep briefly
                    thread::sleep(Duration::from_millis(10));
                }
                Err(e) => {
                    if !self.shutdown.load(Ordering::Relaxed) {
                        tracing::error!("Accept error: {}", e);
                    }
                }
            }
        }

        tracing::info!("Shutting down server...");

        // Connection threads hold their own senders; the appender's loop
        // ends once every one of them is gone
        drop(append_tx);

        for handle in connections {
            if handle.join().is_err() {
                tracing::error!("Connection thread panicked");
            }
        }
        if appender.join().is_err() {
            tracing::error!("Appender thread panicked");
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Hand a fresh connection its own serving thread
    fn spawn_connection(
        &self,
        stream: TcpStream,
        addr: std::net::SocketAddr,
        append_tx: &Sender<AppendRequest>,
        connections: &mut Vec<JoinHandle<()>>,
    ) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);

        let log = Arc::clone(&self.log);
        let appends = append_tx.clone();
        let active = Arc::clone(&self.active_connections);
        let read_timeout_ms = self.config.read_timeout_ms;
        let write_timeout_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name(format!("riftlog-conn-{}", addr))
            .spawn(move || {
                serve_connection(stream, log, appends, read_timeout_ms, write_timeout_ms);
                active.fetch_sub(1, Ordering::Relaxed);
            });

        match spawned {
            Ok(handle) => connections.push(handle),
            Err(e) => {
                tracing::error!("Failed to spawn connection thread: {}", e);
                self.active_connections.fetch_sub(1, Ordering::Relaxed);
            }
        }
    }

    /// Handle for signaling shutdown from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Get the number of active connections
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Get the bound address
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.listener.local_addr().ok()
    }
}

/// Signals a running server to stop accepting and wind down
#[derive(Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    /// Request a graceful shutdown
    pub fn signal(&self) {
        tracing::info!("Shutdown signal received");
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Drive one client for the lifetime of its socket
fn serve_connection(
    stream: TcpStream,
    log: Arc<Log>,
    appends: Sender<AppendRequest>,
    read_timeout_ms: u64,
    write_timeout_ms: u64,
) {
    let mut conn = match Connection::new(stream, log, appends) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to create connection: {}", e);
            return;
        }
    };

    if let Err(e) = conn.set_timeouts(read_timeout_ms, write_timeout_ms) {
        tracing::warn!("Failed to set connection timeouts: {}", e);
    }

    if let Err(e) = conn.handle() {
        tracing::debug!("Connection {} ended with error: {}", conn.peer_addr(), e);
    }
}

/// The log's single appender
///
/// Requests apply in arrival order; every reply is the append's outcome.
/// The loop ends when the last queue sender disconnects.
fn append_loop(log: Arc<Log>, requests: Receiver<AppendRequest>) {
    for request in requests.iter() {
        let mut record = Record::new(request.value);
        let result = log.append(&mut record).map_err(|e| e.to_string());

        if let Err(message) = &result {
            tracing::error!("append failed: {}", message);
        }

        // The producing connection may have hung up mid-flight
        let _ = request.reply.send(result);
    }

    tracing::debug!("append queue drained");
}

/// Turn away a client over the connection limit before dropping it
fn refuse(mut stream: TcpStream) {
    let _ = stream.set_write_timeout(Some(Duration::from_millis(100)));
    let _ = write_response(&mut stream, &Response::error("connection limit reached"));
}
