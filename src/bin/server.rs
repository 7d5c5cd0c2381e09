//! riftlog Server Binary
//!
//! Starts the TCP server fronting a persistent log.

use std::sync::Arc;

use clap::Parser;
use riftlog::network::Server;
use riftlog::{Config, Log};
use tracing_subscriber::{fmt, EnvFilter};

/// riftlog Server
#[derive(Parser, Debug)]
#[command(name = "riftlog-server")]
#[command(about = "Persistent append-only commit log server")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./riftlog_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Segment store size limit in MB before rollover
    #[arg(long, default_value = "64")]
    max_store_mb: u64,

    /// Segment index pre-allocation in MB
    #[arg(long, default_value = "8")]
    max_index_mb: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,riftlog=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("riftlog Server v{}", riftlog::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(args.listen.as_str())
        .max_connections(args.max_connections)
        .max_store_bytes(args.max_store_mb * 1024 * 1024)
        .max_index_bytes(args.max_index_mb * 1024 * 1024)
        .build();

    let log = match Log::open(config.data_dir.as_path(), config.clone()) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            tracing::error!("Failed to open log: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        lowest = log.lowest_offset(),
        highest = log.highest_offset(),
        "Log opened"
    );

    let mut server = match Server::bind(config, Arc::clone(&log)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = log.close() {
        tracing::error!("Failed to close log: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
